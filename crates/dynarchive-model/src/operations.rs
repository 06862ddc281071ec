//! The DynamoDB operations the table tools issue.

use std::fmt;

/// Every remote operation a [`TableOperation`] can name in an error report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableOperation {
    /// Read a table's metadata.
    DescribeTable,
    /// Create a table from a copied schema.
    CreateTable,
    /// Write a single item.
    PutItem,
    /// Read a page of items matching key conditions.
    Query,
    /// Read a page of items from the whole table.
    Scan,
}

impl TableOperation {
    /// Returns the AWS operation name string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DescribeTable => "DescribeTable",
            Self::CreateTable => "CreateTable",
            Self::PutItem => "PutItem",
            Self::Query => "Query",
            Self::Scan => "Scan",
        }
    }
}

impl fmt::Display for TableOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_display_wire_name() {
        assert_eq!(TableOperation::DescribeTable.to_string(), "DescribeTable");
        assert_eq!(TableOperation::PutItem.to_string(), "PutItem");
        assert_eq!(format!("{}", TableOperation::Scan), "Scan");
    }
}
