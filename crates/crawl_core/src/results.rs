use crate::format::{build_play_url, format_count};

/// Upper bound on rows handed to the table; the count label still reflects
/// the full set.
pub const MAX_RENDERED_ROWS: usize = 200;
pub const EMPTY_FIELD: &str = "-";
pub const NO_DATA: &str = "No data";

/// One crawled video as returned by the results endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResultRecord {
    pub bvid: Option<String>,
    pub title: Option<String>,
    pub up_name: Option<String>,
    pub view_count: i64,
    pub favorite_count: i64,
    pub tags: Option<String>,
    pub subject: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayLink {
    pub label: String,
    pub href: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRow {
    pub link: PlayLink,
    pub title: String,
    pub up_name: String,
    pub views: String,
    pub favorites: String,
    pub tags: String,
    pub subject: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableBody {
    Placeholder(String),
    Rows(Vec<ResultRow>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultsTable {
    pub total: usize,
    pub count_label: String,
    pub body: TableBody,
}

impl ResultsTable {
    pub fn rows(&self) -> &[ResultRow] {
        match &self.body {
            TableBody::Rows(rows) => rows,
            TableBody::Placeholder(_) => &[],
        }
    }
}

pub fn render_results(records: &[ResultRecord]) -> ResultsTable {
    let total = records.len();
    let body = if records.is_empty() {
        TableBody::Placeholder(NO_DATA.to_string())
    } else {
        TableBody::Rows(
            records
                .iter()
                .take(MAX_RENDERED_ROWS)
                .map(render_row)
                .collect(),
        )
    };
    ResultsTable {
        total,
        count_label: format!("{total} results"),
        body,
    }
}

fn render_row(record: &ResultRecord) -> ResultRow {
    let href = build_play_url(record.bvid.as_deref());
    ResultRow {
        link: PlayLink {
            label: text_or_dash(record.bvid.as_deref()),
            href,
        },
        title: text_or_dash(record.title.as_deref()),
        up_name: text_or_dash(record.up_name.as_deref()),
        views: format_count(record.view_count),
        favorites: format_count(record.favorite_count),
        tags: text_or_dash(record.tags.as_deref()),
        subject: text_or_dash(non_blank(record.subject.as_deref()).or(record.category.as_deref())),
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.trim().is_empty())
}

fn text_or_dash(value: Option<&str>) -> String {
    non_blank(value).unwrap_or(EMPTY_FIELD).to_string()
}
