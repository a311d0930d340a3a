use shared::protocol::HistoryEntry;

pub const LOADING_TEXT: &str = "Loading history...";
pub const EMPTY_TEXT: &str = "No detection history.";
pub const FAILED_TEXT: &str = "Failed to load history.";

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRow {
    /// 1-based position in the server's ordering.
    pub index: usize,
    pub date: String,
    pub result: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum HistoryTable {
    #[default]
    Idle,
    Loading,
    Empty,
    Failed,
    Rows(Vec<HistoryRow>),
}

impl HistoryTable {
    /// Builds rows in the order received; the server already sorts newest first.
    pub fn from_entries(entries: &[HistoryEntry]) -> Self {
        if entries.is_empty() {
            return HistoryTable::Empty;
        }
        let rows = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| HistoryRow {
                index: i + 1,
                date: entry
                    .detection_day()
                    .map(|day| day.format("%d/%m/%Y").to_string())
                    .unwrap_or_else(|| entry.detection_date.clone()),
                result: entry.result.clone(),
                image_url: entry.raw_image_url.clone(),
            })
            .collect();
        HistoryTable::Rows(rows)
    }

    /// Text of the single spanning row shown instead of data rows.
    pub fn placeholder(&self) -> Option<&'static str> {
        match self {
            HistoryTable::Loading => Some(LOADING_TEXT),
            HistoryTable::Empty => Some(EMPTY_TEXT),
            HistoryTable::Failed => Some(FAILED_TEXT),
            HistoryTable::Idle | HistoryTable::Rows(_) => None,
        }
    }

    pub fn rows(&self) -> &[HistoryRow] {
        match self {
            HistoryTable::Rows(rows) => rows,
            _ => &[],
        }
    }
}
