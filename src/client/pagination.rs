//! Page walk that turns a paginated listing into one sequence

use std::future::Future;

use tracing::{debug, warn};

use super::{error::Result, params::ParamsList, response::ResponseList};

/// Largest page size PocketBase accepts
pub const MAX_PAGE_SIZE: u32 = 500;

/// Fetch page 1 at [`MAX_PAGE_SIZE`], then pages `2..=total_pages` in order,
/// appending their items.
///
/// The returned `page`, `per_page`, `total_items` and `total_pages` are those
/// of the first page; only `items` covers the whole listing. The first failed
/// fetch ends the walk and its error is returned without any items gathered
/// so far. Pages are separate requests, so records changing mid-walk can be
/// skipped or repeated.
pub(crate) async fn collect_pages<T, F, Fut>(
    params: &ParamsList,
    mut fetch: F,
) -> Result<ResponseList<T>>
where
    F: FnMut(ParamsList) -> Fut,
    Fut: Future<Output = Result<ResponseList<T>>>,
{
    let mut params = params.clone();
    params.page = 1;
    params.size = MAX_PAGE_SIZE;

    let mut response = fetch(params.clone()).await?;
    let total_pages = response.total_pages;
    if let Some(expected) = expected_pages(response.total_items, response.per_page) {
        if total_pages > expected {
            warn!(
                total_pages,
                expected,
                total_items = response.total_items,
                per_page = response.per_page,
                "Page count exceeds what the item count implies"
            );
        }
    }

    for page in 2..=total_pages {
        params.page = page;
        let next = fetch(params.clone()).await?;
        response.items.extend(next.items);
    }

    debug!(
        total_pages,
        item_count = response.items.len(),
        "Collected all pages"
    );
    Ok(response)
}

/// Pages needed for `total_items` at `per_page`; `None` when the server sent no page size
fn expected_pages(total_items: u32, per_page: u32) -> Option<u32> {
    (per_page > 0).then(|| total_items.div_ceil(per_page))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::client::error::ClientError;

    fn page(page: u32, total_pages: u32, total_items: u32, items: &[u32]) -> ResponseList<u32> {
        ResponseList {
            page,
            per_page: MAX_PAGE_SIZE,
            total_items,
            total_pages,
            items: items.to_vec(),
        }
    }

    #[tokio::test]
    async fn test_single_page_fetches_once() {
        let seen = Mutex::new(Vec::new());

        let result = collect_pages(&ParamsList::new().with_filters("x"), |p| {
            seen.lock().unwrap().push(p.clone());
            async { Ok(page(1, 1, 2, &[1, 2])) }
        })
        .await
        .unwrap();

        let seen = seen.into_inner().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].page, 1);
        assert_eq!(seen[0].size, MAX_PAGE_SIZE);
        assert_eq!(seen[0].filters, "x");
        assert_eq!(result.items, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_pages_appended_in_order_with_first_page_metadata() {
        let result = collect_pages(&ParamsList::new().with_page(7).with_size(3), |p| {
            let response = match p.page {
                1 => page(1, 3, 5, &[1, 2]),
                2 => page(2, 3, 5, &[3, 4]),
                _ => page(3, 3, 5, &[5]),
            };
            async move { Ok(response) }
        })
        .await
        .unwrap();

        assert_eq!(result.items, vec![1, 2, 3, 4, 5]);
        assert_eq!(result.items.len() as u32, result.total_items);
        assert_eq!(result.page, 1);
        assert_eq!(result.total_pages, 3);
    }

    #[tokio::test]
    async fn test_failure_mid_walk_returns_error_only() {
        let result = collect_pages(&ParamsList::new(), |p| async move {
            match p.page {
                1 => Ok(page(1, 3, 5, &[1, 2])),
                _ => Err(ClientError::invalid_response("list", 500, "boom")),
            }
        })
        .await;

        assert!(result.unwrap_err().is_invalid_response());
    }

    #[test]
    fn test_expected_pages() {
        assert_eq!(expected_pages(0, 500), Some(0));
        assert_eq!(expected_pages(500, 500), Some(1));
        assert_eq!(expected_pages(501, 500), Some(2));
        assert_eq!(expected_pages(10, 0), None);
    }

    #[tokio::test]
    async fn test_inflated_page_count_is_still_walked() {
        let calls = Mutex::new(0u32);

        let result = collect_pages(&ParamsList::new(), |p| {
            *calls.lock().unwrap() += 1;
            let items: &[u32] = if p.page == 1 { &[1] } else { &[] };
            let response = page(p.page, 3, 1, items);
            async move { Ok(response) }
        })
        .await
        .unwrap();

        assert_eq!(*calls.lock().unwrap(), 3);
        assert_eq!(result.items, vec![1]);
    }

    #[tokio::test]
    async fn test_empty_listing() {
        let result = collect_pages(&ParamsList::new(), |_| async { Ok(page(1, 0, 0, &[])) })
            .await
            .unwrap();

        assert!(result.items.is_empty());
    }
}
