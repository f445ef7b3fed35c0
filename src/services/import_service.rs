//! Batch import of `first,second,score` rows.
//!
//! Each identity in the file is reduced to its highest score in that file and
//! written through the store's upsert. Stored scores never take part in the
//! reduction. Malformed rows are skipped with a warning and counted.

use std::collections::HashMap;

use crate::database::ScoreStore;
use crate::models::{IdentityKey, NewUserScore};
use crate::utils::AppResult;

const HEADER_FIRST_FIELD: &str = "first name";
const BYTE_ORDER_MARK: char = '\u{feff}';

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub rows_read: usize,
    pub rows_skipped: usize,
    pub users_upserted: usize,
    /// Highest score in the file, if any row was valid
    pub top_score: Option<i64>,
    /// "First Second" names tied at `top_score`, sorted
    pub top_scorers: Vec<String>,
}

impl ImportReport {
    /// Text printed by the importer CLI.
    pub fn render(&self) -> String {
        match self.top_score {
            Some(score) => format!("{}\nScore: {}", self.top_scorers.join(" "), score),
            None => "No scores found".to_string(),
        }
    }
}

#[derive(Debug, Default)]
struct ParsedInput {
    rows: Vec<NewUserScore>,
    rows_read: usize,
    rows_skipped: usize,
}

fn parse_input(input: &str) -> ParsedInput {
    let mut parsed = ParsedInput::default();
    // Spreadsheet CSV exports often start with a UTF-8 BOM
    let input = input.strip_prefix(BYTE_ORDER_MARK).unwrap_or(input);

    for (index, line) in input.lines().enumerate() {
        let line_no = index + 1;
        if line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields[0].eq_ignore_ascii_case(HEADER_FIRST_FIELD) {
            continue;
        }

        parsed.rows_read += 1;
        match parse_row(&fields) {
            Ok(row) => parsed.rows.push(row),
            Err(reason) => {
                log::warn!("⚠️  Skipping line {}: {} ({:?})", line_no, reason, line);
                parsed.rows_skipped += 1;
            }
        }
    }

    parsed
}

fn parse_row(fields: &[&str]) -> Result<NewUserScore, String> {
    let [first_name, second_name, score] = fields else {
        return Err(format!("expected 3 fields, found {}", fields.len()));
    };

    let score: i64 = score
        .parse()
        .map_err(|_| format!("score '{}' is not an integer", score))?;

    NewUserScore::new(first_name, second_name, score).map_err(|e| e.to_string())
}

/// Highest score per identity, in order of first appearance.
/// The casing of an identity's first row is the one used for insertion.
fn best_per_user(rows: Vec<NewUserScore>) -> Vec<NewUserScore> {
    let mut best: Vec<NewUserScore> = Vec::new();
    let mut positions: HashMap<IdentityKey, usize> = HashMap::new();

    for row in rows {
        match positions.get(&row.identity()) {
            Some(&pos) => {
                if row.score() > best[pos].score() {
                    best[pos].set_score(row.score());
                }
            }
            None => {
                positions.insert(row.identity(), best.len());
                best.push(row);
            }
        }
    }

    best
}

/// Upserts run one identity at a time with no transaction. A store failure
/// returns early and leaves the earlier identities written.
pub async fn import_scores(store: &dyn ScoreStore, input: &str) -> AppResult<ImportReport> {
    let parsed = parse_input(input);
    let best = best_per_user(parsed.rows);

    let top_score = best.iter().map(NewUserScore::score).max();
    let mut top_scorers: Vec<String> = best
        .iter()
        .filter(|row| Some(row.score()) == top_score)
        .map(|row| format!("{} {}", row.first_name(), row.second_name()))
        .collect();
    top_scorers.sort();

    for row in &best {
        store.upsert(row).await?;
    }

    let report = ImportReport {
        rows_read: parsed.rows_read,
        rows_skipped: parsed.rows_skipped,
        users_upserted: best.len(),
        top_score,
        top_scorers,
    };

    log::info!(
        "📥 Import finished: {} rows read, {} skipped, {} users upserted",
        report.rows_read,
        report.rows_skipped,
        report.users_upserted
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::models::UserScore;
    use crate::utils::AppError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fails every upsert after the first `allowed`.
    struct FailingStore {
        inner: MemoryStore,
        allowed: usize,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ScoreStore for FailingStore {
        async fn upsert(&self, score: &NewUserScore) -> AppResult<UserScore> {
            if self.calls.fetch_add(1, Ordering::SeqCst) >= self.allowed {
                return Err(AppError::StoreUnavailable("connection lost".into()));
            }
            self.inner.upsert(score).await
        }

        async fn find_by_identity(&self, identity: &IdentityKey) -> AppResult<Option<UserScore>> {
            self.inner.find_by_identity(identity).await
        }

        async fn list_all(&self) -> AppResult<Vec<UserScore>> {
            self.inner.list_all().await
        }

        async fn top_scorers(&self) -> AppResult<Vec<UserScore>> {
            self.inner.top_scorers().await
        }
    }

    const SAMPLE: &str = "
First name,Second name,Score
Mark,Jobs,38
Sarah,Pieterson,39
Themba,Mahlala,86
";

    #[tokio::test]
    async fn test_finds_single_highest() {
        let store = MemoryStore::new();

        let report = import_scores(&store, SAMPLE).await.unwrap();

        assert_eq!(report.top_scorers, vec!["Themba Mahlala"]);
        assert_eq!(report.top_score, Some(86));
        assert_eq!(report.users_upserted, 3);
        assert_eq!(store.list_all().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_finds_multiple_highest_sorted() {
        let store = MemoryStore::new();
        let input = "Themba,Mahlala,86\nMark,Jobs,38\nSarah,Pieterson,86\n";

        let report = import_scores(&store, input).await.unwrap();

        assert_eq!(report.top_scorers, vec!["Sarah Pieterson", "Themba Mahlala"]);
        assert_eq!(report.render(), "Sarah Pieterson Themba Mahlala\nScore: 86");
    }

    #[tokio::test]
    async fn test_header_is_optional_and_blank_lines_ignored() {
        let store = MemoryStore::new();
        let input = "\r\nMark,Jobs,38\r\n\r\n\r\nSarah,Pieterson,39\r\nThemba,Mahlala,86\r\n";

        let report = import_scores(&store, input).await.unwrap();

        assert_eq!(report.rows_read, 3);
        assert_eq!(report.rows_skipped, 0);
        assert_eq!(report.top_scorers, vec!["Themba Mahlala"]);
    }

    #[tokio::test]
    async fn test_leading_byte_order_mark_is_ignored() {
        let store = MemoryStore::new();
        let input = "\u{feff}First name,Second name,Score\r\nMark,Jobs,38\r\n";

        let report = import_scores(&store, input).await.unwrap();

        assert_eq!(report.rows_read, 1);
        assert_eq!(report.rows_skipped, 0);
        assert_eq!(report.top_scorers, vec!["Mark Jobs"]);
    }

    #[tokio::test]
    async fn test_uses_file_maximum_not_stored_value() {
        let store = MemoryStore::new();
        store
            .upsert(&NewUserScore::new("X", "Y", 100).unwrap())
            .await
            .unwrap();

        import_scores(&store, "X,Y,3\nx,y,9\nX,Y,4\n").await.unwrap();

        let all = store.list_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].score, 9);
    }

    #[tokio::test]
    async fn test_skips_malformed_rows() {
        let store = MemoryStore::new();
        let input = "Mark,Jobs,38\nBroken,Row\nSarah,Pieterson,lots\n ,Nobody,5\nToo,Many,1,2\n";

        let report = import_scores(&store, input).await.unwrap();

        assert_eq!(report.rows_read, 5);
        assert_eq!(report.rows_skipped, 4);
        assert_eq!(report.users_upserted, 1);
        assert_eq!(store.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_store_failure_keeps_earlier_upserts_and_rerun_converges() {
        let input = "Mark,Jobs,38\nSarah,Pieterson,39\nThemba,Mahlala,86\nmark,jobs,40\n";
        let store = FailingStore {
            inner: MemoryStore::new(),
            allowed: 1,
            calls: AtomicUsize::new(0),
        };

        let result = import_scores(&store, input).await;

        assert!(matches!(result, Err(AppError::StoreUnavailable(_))));
        let partial = store.list_all().await.unwrap();
        assert_eq!(partial.len(), 1);
        assert_eq!(partial[0].first_name, "Mark");
        assert_eq!(partial[0].score, 40);

        let report = import_scores(&store.inner, input).await.unwrap();
        assert_eq!(report.users_upserted, 3);
        assert_eq!(store.inner.list_all().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_empty_input_is_a_no_op() {
        let store = MemoryStore::new();

        let report = import_scores(&store, "").await.unwrap();

        assert_eq!(report, ImportReport::default());
        assert_eq!(report.render(), "No scores found");
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[test]
    fn test_best_per_user_keeps_first_casing() {
        let rows = vec![
            NewUserScore::new("Jane", "Doe", 3).unwrap(),
            NewUserScore::new("JANE", "DOE", 12).unwrap(),
            NewUserScore::new("Other", "User", 1).unwrap(),
        ];

        let best = best_per_user(rows);

        assert_eq!(best.len(), 2);
        assert_eq!(best[0].first_name(), "Jane");
        assert_eq!(best[0].score(), 12);
    }
}
