use crate::error::{Error, ErrorKind};
use dlorg_extract::models::{WorkId, WorkMetadata};
use exn::ResultExt;
use time::UtcDateTime;

#[derive(sqlx::FromRow)]
pub(crate) struct WorkRow {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) maker: String,
    #[sqlx(default)]
    pub(crate) series: Option<String>,
    pub(crate) fetched_at: i64,
}
impl WorkRow {
    pub(crate) fn new(metadata: &WorkMetadata, fetched_at: UtcDateTime) -> Self {
        Self {
            id: metadata.id.to_string(),
            name: metadata.name.clone(),
            maker: metadata.maker.clone(),
            series: metadata.series.clone(),
            fetched_at: fetched_at.unix_timestamp(),
        }
    }
}
impl TryFrom<WorkRow> for WorkMetadata {
    type Error = Error;
    fn try_from(row: WorkRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: WorkId::try_from(row.id).or_raise(|| ErrorKind::InvalidData("id"))?,
            name: row.name,
            maker: row.maker,
            series: row.series,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_row_round_trips_metadata() {
        let metadata = WorkMetadata {
            id: "RJ123456".parse().unwrap(),
            name: "Example Work".to_string(),
            maker: "Example Circle".to_string(),
            series: Some("Example Series".to_string()),
        };
        let row = WorkRow::new(&metadata, UtcDateTime::UNIX_EPOCH);
        assert_eq!(row.fetched_at, 0);
        assert_eq!(WorkMetadata::try_from(row).unwrap(), metadata);
    }

    #[rstest]
    #[case::not_a_code("not-a-code")]
    #[case::empty("")]
    #[case::lowercase("rj123456")]
    #[case::short("RJ12345")]
    fn test_invalid_stored_id(#[case] id: &str) {
        let row = WorkRow {
            id: id.to_string(),
            name: "Name".to_string(),
            maker: "Maker".to_string(),
            series: None,
            fetched_at: 0,
        };
        let err = WorkMetadata::try_from(row).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidData("id")));
    }
}
