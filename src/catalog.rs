//! Remote catalog loading

use crate::error::CatalogError;
use crate::types::{Catalog, CatalogRecord, GameEntry};
use tracing::{debug, info, warn};

/// Fetch and parse the game list. Issues exactly one GET.
pub async fn fetch_catalog(client: &reqwest::Client, url: &str) -> Result<Catalog, CatalogError> {
    debug!(url, "Fetching catalog");

    let network = |source: reqwest::Error| CatalogError::Network {
        url: url.to_string(),
        source,
    };
    let response = client
        .get(url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(&network)?;
    let text = response.text().await.map_err(&network)?;

    let catalog = parse_catalog(&text)?;
    info!(count = catalog.len(), "Catalog loaded");
    Ok(catalog)
}

/// Parse the catalog body. The top level must be a non-empty JSON array.
pub fn parse_catalog(text: &str) -> Result<Catalog, CatalogError> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    let serde_json::Value::Array(items) = value else {
        return Err(CatalogError::NotAList);
    };
    if items.is_empty() {
        return Err(CatalogError::Empty);
    }

    let total = items.len();
    let entries: Vec<GameEntry> = items
        .into_iter()
        .enumerate()
        .filter_map(|(i, item)| match serde_json::from_value::<CatalogRecord>(item) {
            Ok(record) => Some(GameEntry::from(record)),
            Err(e) => {
                warn!(index = i, error = %e, "Skipping malformed catalog record");
                None
            }
        })
        .collect();

    if entries.is_empty() {
        warn!(total, "No usable records in catalog");
        return Err(CatalogError::Empty);
    }
    Ok(Catalog::new(entries))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_records_in_order() {
        let catalog = parse_catalog(
            r#"[
                {"Name":"Foo","Author":"Bar","Link":"http://x/f.zip"},
                {"Name":"Second","Description":"desc","Icon":"http://x/i.png"}
            ]"#,
        )
        .unwrap();

        assert_eq!(catalog.len(), 2);
        let first = &catalog.entries()[0];
        assert_eq!(first.name, "Foo");
        assert_eq!(first.author, "Bar");
        assert_eq!(first.download_link.as_deref(), Some("http://x/f.zip"));
        let second = &catalog.entries()[1];
        assert_eq!(second.name, "Second");
        assert_eq!(second.author, "Неизвестен");
        assert_eq!(second.icon_url.as_deref(), Some("http://x/i.png"));
    }

    #[test]
    fn non_array_is_format_error() {
        let err = parse_catalog(r#"{"games": []}"#).unwrap_err();
        assert!(matches!(err, CatalogError::NotAList));
        assert!(err.is_format());
        assert!(!err.is_soft());
    }

    #[test]
    fn invalid_json_is_format_error() {
        let err = parse_catalog("[{\"Name\": ").unwrap_err();
        assert!(matches!(err, CatalogError::Parse(_)));
        assert!(err.is_format());
    }

    #[test]
    fn empty_array_is_soft() {
        let err = parse_catalog("[]").unwrap_err();
        assert!(matches!(err, CatalogError::Empty));
        assert!(err.is_soft());
        assert_eq!(err.to_string(), "Список игр пуст.");
    }

    #[test]
    fn malformed_records_are_skipped() {
        let catalog = parse_catalog(r#"[1, {"Name": 5}, {"Name":"Ok"}, null]"#).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.entries()[0].name, "Ok");
    }

    #[test]
    fn only_malformed_records_is_empty() {
        let err = parse_catalog(r#"["a", 2]"#).unwrap_err();
        assert!(err.is_soft());
    }

    #[tokio::test]
    async fn refused_connection_is_network_error() {
        let client = reqwest::Client::new();
        let err = fetch_catalog(&client, "http://127.0.0.1:1/games.json")
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Network { .. }));
    }
}
