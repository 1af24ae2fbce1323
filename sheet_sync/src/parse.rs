//! Row parsers of the `Kampagner`, `Annoncer` and `Keywords` tabs.
//!
//! A row failing the required field checks is dropped with a warning,
//! it never fails the whole parse.
use chrono::{DateTime, Utc};
use primitives::{
    ad_def, campaign_def, keyword_def,
    util::cell::RawRow,
    A1Range, AdDef, CampaignDef, CampaignStatus, Column, KeywordDef, MatchType, Record, RecordId,
    RowIndex, Scope,
};
use slog::{warn, Logger};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SkipReason {
    #[error("missing {0}")]
    Missing(&'static str),
}

/// The tab a record kind is mirrored to and how its rows are read.
pub trait TabLayout: Record {
    const TAB: &'static str;
    const LAST_COLUMN: Column;
    /// Row `1` of a newly created tab.
    const HEADERS: &'static [&'static str];

    /// Every data row of the tab, e.g. `Kampagner!A2:E`.
    fn range() -> A1Range {
        A1Range::open_rows(
            Self::TAB,
            Column::new(0),
            Self::LAST_COLUMN,
            RowIndex::FIRST_DATA_ROW,
        )
    }

    fn parse_row(
        scope: &Scope,
        row_index: RowIndex,
        row: RawRow<'_>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, SkipReason>;
}

fn required(row: RawRow<'_>, column: Column, field: &'static str) -> Result<String, SkipReason> {
    row.optional(column).ok_or(SkipReason::Missing(field))
}

impl TabLayout for CampaignDef {
    const TAB: &'static str = "Kampagner";
    const LAST_COLUMN: Column = campaign_def::columns::LAST;
    const HEADERS: &'static [&'static str] =
        &["Campaign Name", "Status", "Budget", "Start Date", "End Date"];

    fn parse_row(
        scope: &Scope,
        row_index: RowIndex,
        row: RawRow<'_>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, SkipReason> {
        use campaign_def::columns;

        Ok(Self {
            id: RecordId::new(),
            tenant_id: scope.tenant_id.clone(),
            user_id: scope.user_id.clone(),
            sheet_id: scope.sheet_id.clone(),
            campaign_id: Some(row_index.to_string()),
            name: required(row, columns::NAME, "name")?,
            status: CampaignStatus::normalize(row.text(columns::STATUS)),
            budget: row.number(columns::BUDGET),
            start_date: required(row, columns::START_DATE, "startDate")?,
            end_date: required(row, columns::END_DATE, "endDate")?,
            row_index,
            created_at,
        })
    }
}

impl TabLayout for AdDef {
    const TAB: &'static str = "Annoncer";
    const LAST_COLUMN: Column = ad_def::columns::LAST;
    const HEADERS: &'static [&'static str] = &[
        "Ad Group",
        "Headline 1",
        "Headline 2",
        "Description",
        "Final URL",
        "Path 1",
        "Path 2",
    ];

    fn parse_row(
        scope: &Scope,
        row_index: RowIndex,
        row: RawRow<'_>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, SkipReason> {
        use ad_def::columns;

        Ok(Self {
            id: RecordId::new(),
            tenant_id: scope.tenant_id.clone(),
            user_id: scope.user_id.clone(),
            sheet_id: scope.sheet_id.clone(),
            ad_group: required(row, columns::AD_GROUP, "adGroup")?,
            headline1: required(row, columns::HEADLINE_1, "headline1")?,
            headline2: row.optional(columns::HEADLINE_2),
            description: required(row, columns::DESCRIPTION, "description")?,
            final_url: required(row, columns::FINAL_URL, "finalUrl")?,
            path1: row.optional(columns::PATH_1),
            path2: row.optional(columns::PATH_2),
            row_index,
            created_at,
        })
    }
}

impl TabLayout for KeywordDef {
    const TAB: &'static str = "Keywords";
    const LAST_COLUMN: Column = keyword_def::columns::LAST;
    const HEADERS: &'static [&'static str] = &["Ad Group", "Keyword", "Match Type", "CPC"];

    fn parse_row(
        scope: &Scope,
        row_index: RowIndex,
        row: RawRow<'_>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, SkipReason> {
        use keyword_def::columns;

        Ok(Self {
            id: RecordId::new(),
            tenant_id: scope.tenant_id.clone(),
            user_id: scope.user_id.clone(),
            sheet_id: scope.sheet_id.clone(),
            ad_group: required(row, columns::AD_GROUP, "adGroup")?,
            keyword: required(row, columns::KEYWORD, "keyword")?,
            match_type: MatchType::normalize(row.text(columns::MATCH_TYPE)),
            cpc: row.number(columns::CPC),
            row_index,
            created_at,
        })
    }
}

/// The records of a tab in row order.
#[derive(Debug, Clone)]
pub struct Parsed<R> {
    pub records: Vec<R>,
    /// Rows dropped by the required field checks.
    pub skipped: usize,
}

/// Parses the rows of a range read starting at row `2`.
///
/// Every record keeps the physical row it was read from, gaps left by dropped rows included.
pub fn parse_rows<R: TabLayout>(logger: &Logger, scope: &Scope, rows: &[Vec<String>]) -> Parsed<R> {
    let created_at = Utc::now();
    let mut parsed = Parsed {
        records: Vec::with_capacity(rows.len()),
        skipped: 0,
    };

    for (offset, cells) in rows.iter().enumerate() {
        let row_index = RowIndex::from_offset(offset);

        match R::parse_row(scope, row_index, RawRow(cells), created_at) {
            Ok(record) => parsed.records.push(record),
            Err(reason) => {
                warn!(logger, "Skipping invalid row"; "tab" => R::TAB, "row" => row_index.get(), "reason" => %reason);
                parsed.skipped += 1;
            }
        }
    }

    parsed
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use primitives::test_util::{
        ad_rows, campaign_rows, discard_logger, keyword_rows, rows, DUMMY_SCOPE,
    };

    use super::*;

    fn row_indices<R: Record>(records: &[R]) -> Vec<i64> {
        records.iter().map(|record| record.row_index().get()).collect()
    }

    #[test]
    fn tab_ranges() {
        assert_eq!("Kampagner!A2:E", CampaignDef::range().to_string());
        assert_eq!("Annoncer!A2:G", AdDef::range().to_string());
        assert_eq!("Keywords!A2:D", KeywordDef::range().to_string());
    }

    #[test]
    fn dropped_rows_keep_the_physical_rows_of_the_others() {
        let logger = discard_logger();

        let campaigns = parse_rows::<CampaignDef>(&logger, &DUMMY_SCOPE, &campaign_rows());
        assert_eq!(vec![2, 4], row_indices(&campaigns.records));
        assert_eq!(1, campaigns.skipped);

        let keywords = parse_rows::<KeywordDef>(&logger, &DUMMY_SCOPE, &keyword_rows());
        assert_eq!(vec![2, 4], row_indices(&keywords.records));
        assert_eq!(1, keywords.skipped);

        let ads = parse_rows::<AdDef>(&logger, &DUMMY_SCOPE, &ad_rows());
        assert_eq!(vec![2, 3, 4, 5, 6], row_indices(&ads.records));
        assert_eq!(0, ads.skipped);
    }

    #[test]
    fn campaign_fields() {
        let parsed = parse_rows::<CampaignDef>(&discard_logger(), &DUMMY_SCOPE, &campaign_rows());

        let summer = &parsed.records[0];
        assert_eq!("Summer sale", summer.name);
        assert_eq!(CampaignStatus::Enabled, summer.status);
        assert_eq!(Some(150.0), summer.budget);
        assert_eq!(Some("2".to_string()), summer.campaign_id);
        assert!(summer.in_scope(&DUMMY_SCOPE));

        let spring = &parsed.records[1];
        assert_eq!(CampaignStatus::Paused, spring.status, "Status is case-insensitive");
        assert_eq!(None, spring.budget);
        assert_eq!(Some("4".to_string()), spring.campaign_id);
    }

    #[test]
    fn keyword_defaults() {
        let parsed = parse_rows::<KeywordDef>(&discard_logger(), &DUMMY_SCOPE, &keyword_rows());

        assert_eq!(MatchType::Exact, parsed.records[0].match_type);
        assert_eq!(Some(1.5), parsed.records[0].cpc);

        assert_eq!(MatchType::Broad, parsed.records[1].match_type);
        assert_eq!(None, parsed.records[1].cpc, "A non-numeric cpc is left out");
    }

    #[test]
    fn ads_need_every_required_field() {
        let raw = rows(&[
            &["Shoes", "Red shoes", "", "Buy red shoes"],
            &["", "Blue shoes", "", "Buy blue shoes", "https://shop.example/blue"],
            &["  Shoes ", " Green shoes ", "  ", "Buy green", " https://shop.example/green ", "", "green"],
            &[],
        ]);

        let parsed = parse_rows::<AdDef>(&discard_logger(), &DUMMY_SCOPE, &raw);

        assert_eq!(3, parsed.skipped);
        assert_eq!(vec![4], row_indices(&parsed.records));

        let green = &parsed.records[0];
        assert_eq!("Shoes", green.ad_group);
        assert_eq!("Green shoes", green.headline1);
        assert_eq!(None, green.headline2);
        assert_eq!("https://shop.example/green", green.final_url);
        assert_eq!(None, green.path1);
        assert_eq!(Some("green".to_string()), green.path2);

        assert_eq!(
            Err(SkipReason::Missing("finalUrl")),
            AdDef::parse_row(&DUMMY_SCOPE, RowIndex::new(2), RawRow(&raw[0]), Utc::now())
        );
    }
}
