//! Archive, top and restore against a running server.

#[cfg(test)]
mod tests {
    use dynarchive_core::tasks::{archive_table, restore_table, top_items};
    use dynarchive_core::{ConfigFile, ReadJob, RunOverrides, RunSettings, TokioClock};
    use dynarchive_model::Item;

    use crate::{
        cleanup_tables, count_items, create_table, dynamodb_client, seed_items, table_client,
        test_table_name,
    };

    fn parse_lines(out: &[u8]) -> Vec<Item> {
        String::from_utf8(out.to_vec())
            .expect("utf-8")
            .lines()
            .map(|l| serde_json::from_str(l).expect("item"))
            .collect()
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_archive_and_restore_table() {
        let client = dynamodb_client();
        let tables = table_client(&client);
        let src = test_table_name("archive");
        let dest = test_table_name("restore");
        create_table(&client, &src, false, 20).await;
        create_table(&client, &dest, false, 20).await;
        seed_items(&client, &src, 30, false).await;

        let job = ReadJob::new(src.clone(), RunSettings::default());
        let mut out = Vec::new();
        let report = archive_table(&tables, &TokioClock, &job, &mut out)
            .await
            .expect("archive");
        assert_eq!(report.items, 30);
        // 20 RCU caps each page at 20 items
        assert_eq!(report.pages, 2);
        assert_eq!(parse_lines(&out).len(), 30);

        let restored = restore_table(&out[..], &tables, &TokioClock, &dest, &RunSettings::default())
            .await
            .expect("restore");
        assert_eq!(restored.items, 30);
        assert_eq!(count_items(&client, &dest).await, 30);

        cleanup_tables(&client, &[&src, &dest]).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_print_top_items() {
        let client = dynamodb_client();
        let tables = table_client(&client);
        let name = test_table_name("top");
        create_table(&client, &name, false, 3).await;
        seed_items(&client, &name, 10, false).await;

        let job = ReadJob::new(name.clone(), RunSettings::default());
        let mut out = Vec::new();
        let report = top_items(&tables, &TokioClock, &job, 7, &mut out)
            .await
            .expect("top");
        assert_eq!(report.items, 7);
        assert_eq!(parse_lines(&out).len(), 7);
        assert!(report.last_evaluated_key.is_some());

        cleanup_tables(&client, &[&name]).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_archive_query_results() {
        let client = dynamodb_client();
        let tables = table_client(&client);
        let name = test_table_name("query");
        create_table(&client, &name, true, 10).await;
        seed_items(&client, &name, 12, true).await;

        let overrides = RunOverrides {
            query: Some(
                r#"{"pk":{"ComparisonOperator":"EQ","AttributeValueList":[{"S":"p"}]},
                    "sk":{"ComparisonOperator":"GE","AttributeValueList":[{"N":"4"}]}}"#
                    .to_owned(),
            ),
            ..RunOverrides::default()
        };
        let settings = RunSettings::resolve(&ConfigFile::default(), &overrides).expect("settings");
        let job = ReadJob::new(name.clone(), settings);
        let mut out = Vec::new();
        let report = archive_table(&tables, &TokioClock, &job, &mut out)
            .await
            .expect("archive query");
        assert_eq!(report.items, 8);

        cleanup_tables(&client, &[&name]).await;
    }
}
