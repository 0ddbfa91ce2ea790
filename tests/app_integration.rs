use serde_json::{Value, json};
use std::fs;
use std::path::Path;
use tracing::info;

mod test_utils {
    use wiremock::matchers::{body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub const HOMEPAGE: &str = r#"<script>$.post('/json', {param: "tok-42"})</script>"#;

    pub async fn mount_bonbast(mock_server: &MockServer, homepage: &str, prices: &str) {
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(homepage))
            .mount(mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/json"))
            .and(header("cookie", "st_bb=0"))
            .and(body_string("param=tok-42"))
            .respond_with(ResponseTemplate::new(200).set_body_string(prices))
            .mount(mock_server)
            .await;
    }

    pub async fn create_bonbast_mock_server(homepage: &str, prices: &str) -> MockServer {
        let mock_server = MockServer::start().await;
        mount_bonbast(&mock_server, homepage, prices).await;
        mock_server
    }

    pub fn write_config(dir: &std::path::Path, base_url: &str) -> std::path::PathBuf {
        let config_path = dir.join("config.yaml");
        let config_content = format!(
            r#"
        provider:
          base_url: {}
        timezone: "Asia/Tehran"
        data_path: {}
    "#,
            base_url,
            dir.join("data").display()
        );
        std::fs::write(&config_path, config_content).expect("Failed to write config file");
        config_path
    }
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).expect("Failed to read snapshot"))
        .expect("Snapshot is not valid JSON")
}

// Adds automatic logging to test
#[test_log::test(tokio::test)]
async fn test_sync_seed_and_roll_over() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let data_dir = dir.path().join("data");

    let day_one = json!({
        "usd1": "61000",
        "eur1": "66000",
        "created": "January 4, 2024 09:00",
        "last_modified": "January 4, 2024 10:00"
    });
    let mock_server =
        test_utils::create_bonbast_mock_server(test_utils::HOMEPAGE, &day_one.to_string()).await;
    let config_path = test_utils::write_config(dir.path(), &mock_server.uri());
    let config_path = config_path.to_str().unwrap();

    // First sync only stores the raw result; there is nothing to merge into yet
    nerkh::run_command(nerkh::AppCommand::Sync, Some(config_path))
        .await
        .expect("First sync failed");
    assert_eq!(read_json(&data_dir.join("new.json")), day_one);
    assert!(!data_dir.join("Prices_Current.json").exists());

    nerkh::run_command(nerkh::AppCommand::Seed, Some(config_path))
        .await
        .expect("Seed failed");
    let seeded = read_json(&data_dir.join("Prices_Current.json"));
    assert_eq!(seeded["last_modified"], "January 04, 2024 13:30");
    assert_eq!(read_json(&data_dir.join("Prices_Previous.json")), seeded);

    // Next day the provider reports new rates and an extra currency
    mock_server.reset().await;
    let day_two = json!({
        "usd1": "61500",
        "eur1": "66000",
        "gbp1": "78000",
        "created": "January 5, 2024 09:00",
        "last_modified": "January 5, 2024 10:00"
    });
    test_utils::mount_bonbast(&mock_server, test_utils::HOMEPAGE, &day_two.to_string()).await;

    nerkh::run_command(nerkh::AppCommand::Sync, Some(config_path))
        .await
        .expect("Second sync failed");

    let current = read_json(&data_dir.join("Prices_Current.json"));
    info!(?current, "Current after second sync");
    assert_eq!(
        current,
        json!({
            "usd1": "61500",
            "eur1": "66000",
            "created": "January 5, 2024 09:00",
            "last_modified": "January 05, 2024 13:30"
        })
    );

    // Previous is now exactly one day behind current and stays as seeded
    assert_eq!(read_json(&data_dir.join("Prices_Previous.json")), seeded);

    // A third sync a day later finds previous two days behind and rolls the
    // prices forward while keeping its own metadata
    mock_server.reset().await;
    let day_three = json!({
        "usd1": "62000",
        "eur1": "66500",
        "last_modified": "January 6, 2024 10:00"
    });
    test_utils::mount_bonbast(&mock_server, test_utils::HOMEPAGE, &day_three.to_string()).await;

    nerkh::run_command(nerkh::AppCommand::Sync, Some(config_path))
        .await
        .expect("Third sync failed");

    let previous = read_json(&data_dir.join("Prices_Previous.json"));
    assert_eq!(previous["usd1"], "62000");
    assert_eq!(previous["eur1"], "66500");
    assert_eq!(previous["created"], "January 4, 2024 09:00");
    assert_eq!(previous["last_modified"], "January 04, 2024 13:30");
    assert!(previous.get("gbp1").is_none());

    nerkh::run_command(nerkh::AppCommand::Show, Some(config_path))
        .await
        .expect("Show failed");
}

#[test_log::test(tokio::test)]
async fn test_sync_failure_leaves_documents_untouched() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let data_dir = dir.path().join("data");
    fs::create_dir_all(&data_dir).unwrap();

    let latest = r#"{"usd1": "61200"}"#;
    fs::write(data_dir.join("new.json"), latest).unwrap();
    let current = r#"{"usd1": "61000"}"#;
    fs::write(data_dir.join("Prices_Current.json"), current).unwrap();

    let mock_server =
        test_utils::create_bonbast_mock_server("<html>no token</html>", r#"{"usd1": "1"}"#)
            .await;
    let config_path = test_utils::write_config(dir.path(), &mock_server.uri());

    let result =
        nerkh::run_command(nerkh::AppCommand::Sync, Some(config_path.to_str().unwrap())).await;

    assert!(result.is_err(), "Sync should fail without a token");
    assert_eq!(fs::read_to_string(data_dir.join("new.json")).unwrap(), latest);
    assert!(!data_dir.join("Prices_Previous.json").exists());
    assert_eq!(
        fs::read_to_string(data_dir.join("Prices_Current.json")).unwrap(),
        current
    );
}

#[test_log::test(tokio::test)]
async fn test_missing_config_file_is_an_error() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let missing = dir.path().join("nope.yaml");

    let result = nerkh::run_command(nerkh::AppCommand::Show, Some(missing.to_str().unwrap())).await;

    let err = result.expect_err("Missing config should fail");
    assert!(err.to_string().starts_with("Failed to read config file"));
}
