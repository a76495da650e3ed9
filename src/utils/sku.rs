use std::future::Future;

use rand::Rng;
use tracing::{debug, warn};

use crate::model::inventory::{InventoryItem, NewItem};
use crate::store::{InventoryStore, StoreError, StoreResult};

pub const SKU_PREFIX: &str = "SKU-";
const SKU_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const SKU_BODY_LEN: usize = 9;

/// Upper bound on regenerate-and-recheck rounds.
pub const MAX_SKU_ATTEMPTS: usize = 16;

/// `SKU-` followed by nine base-36 characters.
pub fn candidate<R: Rng + ?Sized>(rng: &mut R) -> String {
    let body: String = (0..SKU_BODY_LEN)
        .map(|_| SKU_ALPHABET[rng.random_range(0..SKU_ALPHABET.len())] as char)
        .collect();
    format!("{SKU_PREFIX}{body}")
}

/// Generates candidates until `taken` reports one as free.
pub async fn unique_sku<F, Fut>(mut taken: F) -> StoreResult<String>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = StoreResult<bool>>,
{
    for attempt in 1..=MAX_SKU_ATTEMPTS {
        let sku = candidate(&mut rand::rng());
        if !taken(sku.clone()).await? {
            return Ok(sku);
        }
        debug!(attempt, sku = %sku, "SKU already taken, regenerating");
    }

    warn!(attempts = MAX_SKU_ATTEMPTS, "Could not find a free SKU");
    Err(StoreError::Backend(format!(
        "no free SKU after {MAX_SKU_ATTEMPTS} attempts"
    )))
}

/// Inserts `item` under a freshly generated SKU.
///
/// The existence check and the insert are not atomic; a concurrent writer can
/// claim the same code in between. The unique index then rejects the insert
/// and the loop starts over with a new code.
pub async fn insert_with_unique_sku(
    store: &dyn InventoryStore,
    mut item: NewItem,
) -> StoreResult<InventoryItem> {
    for _ in 0..MAX_SKU_ATTEMPTS {
        item.sku = unique_sku(|sku| async move { store.sku_exists(&sku).await }).await?;

        match store.insert(item.clone()).await {
            Ok(saved) => return Ok(saved),
            Err(StoreError::Conflict(_)) => {
                debug!(sku = %item.sku, "SKU claimed concurrently, retrying");
            }
            Err(e) => return Err(e),
        }
    }

    Err(StoreError::Backend(format!(
        "insert kept colliding after {MAX_SKU_ATTEMPTS} attempts"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::test_support::new_item;
    use std::cell::Cell;
    use std::collections::HashSet;

    #[test]
    fn candidates_have_the_expected_shape() {
        let mut rng = rand::rng();
        for _ in 0..100 {
            let sku = candidate(&mut rng);
            let body = sku.strip_prefix(SKU_PREFIX).unwrap();
            assert_eq!(body.len(), SKU_BODY_LEN);
            assert!(body.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
        }
    }

    #[actix_web::test]
    async fn retries_past_collisions() {
        let calls = Cell::new(0);
        let sku = unique_sku(|_| {
            calls.set(calls.get() + 1);
            let taken = calls.get() <= 3;
            async move { Ok(taken) }
        })
        .await
        .unwrap();

        assert_eq!(calls.get(), 4);
        assert!(sku.starts_with(SKU_PREFIX));
    }

    #[actix_web::test]
    async fn gives_up_after_the_attempt_bound() {
        let calls = Cell::new(0);
        let result = unique_sku(|_| {
            calls.set(calls.get() + 1);
            async { Ok(true) }
        })
        .await;

        assert!(matches!(result, Err(StoreError::Backend(_))));
        assert_eq!(calls.get(), MAX_SKU_ATTEMPTS);
    }

    #[actix_web::test]
    async fn generated_skus_are_unique_across_the_collection() {
        let store = MemoryStore::default();
        for _ in 0..200 {
            insert_with_unique_sku(&store, new_item("Elbow 90", crate::model::inventory::Category::Fittings))
                .await
                .unwrap();
        }

        let items = InventoryStore::list(&store).await.unwrap();
        let skus: HashSet<_> = items.iter().map(|i| i.sku.as_str()).collect();
        assert_eq!(items.len(), 200);
        assert_eq!(skus.len(), 200);
    }
}
