/// Pagination walker for the global feed.
///
/// The `posts` table is partitioned by time bucket and a recent bucket may
/// hold fewer rows than a page, so a page is filled by scanning buckets
/// backward in time. Ids encode their creation instant, therefore each
/// per-bucket result is already newest-first and concatenating results from
/// strictly decreasing buckets yields a globally strictly-decreasing page,
/// with no cross-bucket merge needed.
use crate::error::Result;
use crate::models::PostRow;
use crate::repository::PostRepository;
use async_trait::async_trait;
use std::time::Duration;

/// One bounded newest-first read of a single bucket. The seam that lets the
/// walk run against a test double instead of Postgres.
#[async_trait]
pub trait BucketScan: Send + Sync {
    async fn scan(&self, bucket: i64, before_id: Option<i64>, limit: i64) -> Result<Vec<PostRow>>;
}

#[async_trait]
impl BucketScan for PostRepository {
    async fn scan(&self, bucket: i64, before_id: Option<i64>, limit: i64) -> Result<Vec<PostRow>> {
        self.scan_bucket(bucket, before_id, limit).await
    }
}

/// Bucket to start the walk from. With a cursor the walk starts at the
/// cursor's own bucket: every row below the cursor was written at or before
/// the cursor's instant, so higher buckets cannot hold matches and skipping
/// them also removes the boundary hazard of a bucket being created mid-walk.
///
/// Ids are allocated positive, so a non-positive cursor cannot reference a
/// stored row; it is ignored rather than mapped to a bucket below the epoch.
pub fn start_bucket(cursor_id: Option<i64>, window: Duration) -> i64 {
    match cursor_id {
        Some(cursor) if cursor > 0 => snowflake_id::bucket_of(cursor, window),
        _ => snowflake_id::current_bucket(window),
    }
}

/// Fill a page of up to `limit` rows, strictly decreasing by id.
///
/// One bounded query per bucket, visited in descending order; the cursor
/// filter applies only to the first bucket visited. Terminates when the page
/// is full or the walk reaches bucket 0, the epoch start and hard floor.
pub async fn collect_page<S>(
    store: &S,
    start_bucket: i64,
    limit: i64,
    cursor_id: Option<i64>,
) -> Result<Vec<PostRow>>
where
    S: BucketScan + ?Sized,
{
    let mut page = Vec::with_capacity(limit.max(0) as usize);
    let mut remaining = limit;
    let mut bucket = start_bucket;
    let mut before_id = cursor_id.filter(|&cursor| cursor > 0);

    while remaining > 0 && bucket >= 0 {
        let rows = store.scan(bucket, before_id, remaining).await?;
        remaining -= rows.len() as i64;
        page.extend(rows);

        // Rows in every older bucket are below the cursor by construction.
        before_id = None;
        bucket -= 1;
    }

    Ok(page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    fn row(id: i64) -> PostRow {
        PostRow {
            id,
            owner_id: 1,
            message: format!("post {id}"),
            attachment_ids: Vec::new(),
        }
    }

    /// In-memory bucket store that behaves like the SQL scan and records
    /// every call it receives.
    struct FakeBuckets {
        buckets: HashMap<i64, Vec<i64>>,
        calls: Mutex<Vec<(i64, Option<i64>, i64)>>,
    }

    impl FakeBuckets {
        fn new(buckets: &[(i64, &[i64])]) -> Self {
            Self {
                buckets: buckets
                    .iter()
                    .map(|(b, ids)| (*b, ids.to_vec()))
                    .collect(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<(i64, Option<i64>, i64)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl BucketScan for FakeBuckets {
        async fn scan(
            &self,
            bucket: i64,
            before_id: Option<i64>,
            limit: i64,
        ) -> Result<Vec<PostRow>> {
            self.calls.lock().unwrap().push((bucket, before_id, limit));
            let mut ids = self.buckets.get(&bucket).cloned().unwrap_or_default();
            ids.sort_unstable_by(|a, b| b.cmp(a));
            Ok(ids
                .into_iter()
                .filter(|id| before_id.map_or(true, |cursor| *id < cursor))
                .take(limit as usize)
                .map(row)
                .collect())
        }
    }

    #[tokio::test]
    async fn fills_a_page_across_sparse_buckets() {
        let store = FakeBuckets::new(&[(5, &[500, 501]), (4, &[]), (3, &[300, 301, 302])]);

        let page = collect_page(&store, 5, 4, None).await.unwrap();

        let ids: Vec<i64> = page.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![501, 500, 302, 301]);
    }

    #[tokio::test]
    async fn never_returns_more_than_limit_and_ids_strictly_decrease() {
        let store = FakeBuckets::new(&[(2, &[20, 21, 22]), (1, &[10, 11]), (0, &[1, 2, 3])]);

        let page = collect_page(&store, 2, 100, None).await.unwrap();

        assert!(page.len() <= 100);
        for pair in page.windows(2) {
            assert!(pair[0].id > pair[1].id);
        }
        assert_eq!(page.len(), 8);
    }

    #[tokio::test]
    async fn cursor_filter_applies_only_to_the_first_bucket_visited() {
        let store = FakeBuckets::new(&[(2, &[20, 25]), (1, &[10]), (0, &[1])]);

        let page = collect_page(&store, 2, 10, Some(25)).await.unwrap();

        let ids: Vec<i64> = page.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![20, 10, 1]);

        let calls = store.calls();
        assert_eq!(calls[0], (2, Some(25), 10));
        assert_eq!(calls[1], (1, None, 9));
        assert_eq!(calls[2], (0, None, 8));
    }

    #[tokio::test]
    async fn stops_at_bucket_zero_without_underflow() {
        let store = FakeBuckets::new(&[]);

        let page = collect_page(&store, 2, 5, None).await.unwrap();

        assert!(page.is_empty());
        let visited: Vec<i64> = store.calls().iter().map(|(b, _, _)| *b).collect();
        assert_eq!(visited, vec![2, 1, 0]);
    }

    #[tokio::test]
    async fn stops_early_once_the_page_is_full() {
        let store = FakeBuckets::new(&[(3, &[30, 31, 32]), (2, &[20])]);

        let page = collect_page(&store, 3, 2, None).await.unwrap();

        assert_eq!(page.len(), 2);
        assert_eq!(store.calls().len(), 1);
    }

    #[tokio::test]
    async fn pathological_cursor_terminates_the_walk() {
        // A cursor like i64::MIN maps below the epoch; the walk must ignore
        // it and still stop at the bucket floor instead of descending forever.
        let window = Duration::from_secs(3 * 60 * 60);
        let store = FakeBuckets::new(&[(1, &[10]), (0, &[1])]);

        let start = start_bucket(Some(i64::MIN), window);
        assert!(start >= 0);

        let page = collect_page(&store, 1, 5, Some(i64::MIN)).await.unwrap();
        let ids: Vec<i64> = page.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![10, 1]);

        let calls = store.calls();
        assert_eq!(calls.len(), 2);
        // The non-positive cursor is dropped, not forwarded as a filter.
        assert_eq!(calls[0], (1, None, 5));
    }

    #[tokio::test]
    async fn negative_start_bucket_issues_no_scans() {
        let store = FakeBuckets::new(&[(0, &[1, 2])]);

        let page = collect_page(&store, -42, 5, None).await.unwrap();

        assert!(page.is_empty());
        assert!(store.calls().is_empty());
    }

    #[test]
    fn non_positive_cursor_starts_from_the_current_bucket() {
        let window = Duration::from_secs(3 * 60 * 60);
        for cursor in [0, -1, i64::MIN] {
            assert_eq!(
                start_bucket(Some(cursor), window),
                snowflake_id::current_bucket(window)
            );
        }
    }

    #[test]
    fn start_bucket_uses_the_cursor_bucket_when_present() {
        let window = Duration::from_secs(3 * 60 * 60);
        let window_ms = 3 * 60 * 60 * 1000;
        // An id minted in the fifth window lands the walk in bucket 4.
        let cursor = (4 * window_ms + 42) << 22;
        assert_eq!(start_bucket(Some(cursor), window), 4);
        assert_eq!(start_bucket(None, window), snowflake_id::current_bucket(window));
    }
}
