//! Copy and copy-structure against a running server.

#[cfg(test)]
mod tests {
    use dynarchive_core::schema::copy_structure;
    use dynarchive_core::tasks::copy_table;
    use dynarchive_core::{ReadJob, RunSettings, TableClient, TokioClock};
    use dynarchive_model::ErrorCode;

    use crate::{
        cleanup_tables, count_items, create_table, dynamodb_client, seed_items, table_client,
        test_table_name,
    };

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_copy_structure_then_items() {
        let client = dynamodb_client();
        let tables = table_client(&client);
        let src = test_table_name("copy-src");
        let dest = test_table_name("copy-dest");
        create_table(&client, &src, false, 50).await;
        seed_items(&client, &src, 25, false).await;

        let created = copy_structure(&tables, &src, &tables, &dest)
            .await
            .expect("copy structure")
            .expect("created table description");
        assert_eq!(created.table_name.as_deref(), Some(dest.as_str()));
        assert_eq!(created.hash_key_name(), Some("pk"));

        let job = ReadJob::new(src.clone(), RunSettings::default());
        let report = copy_table(&tables, &tables, &TokioClock, &job, &dest)
            .await
            .expect("copy");
        assert_eq!(report.items, 25);
        assert_eq!(count_items(&client, &dest).await, 25);

        cleanup_tables(&client, &[&src, &dest]).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_report_missing_source_table() {
        let client = dynamodb_client();
        let tables = table_client(&client);
        let dest = test_table_name("copy-missing");
        create_table(&client, &dest, false, 5).await;

        let job = ReadJob::new(test_table_name("absent"), RunSettings::default());
        let err = copy_table(&tables, &tables, &TokioClock, &job, &dest)
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some(&ErrorCode::ResourceNotFoundException));
        assert_eq!(count_items(&client, &dest).await, 0);

        cleanup_tables(&client, &[&dest]).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_describe_provisioned_capacity() {
        let client = dynamodb_client();
        let tables = table_client(&client);
        let name = test_table_name("describe");
        create_table(&client, &name, true, 7).await;

        let desc = tables.table_description(&name).await.expect("describe");
        assert_eq!(desc.read_capacity_units(), 7);
        assert_eq!(desc.write_capacity_units(), 7);
        assert_eq!(desc.key_schema.len(), 2);

        cleanup_tables(&client, &[&name]).await;
    }
}
