//! Typed access to the basket stored in the session.

use tower_sessions::Session;

use corner_shop_core::Basket;

use crate::models::session_keys;

/// The basket keys of one visitor's session.
pub struct BasketSession<'a> {
    session: &'a Session,
}

impl<'a> BasketSession<'a> {
    #[must_use]
    pub const fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// Read the basket, empty if the key is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails or the value is not a list.
    pub async fn load(&self) -> Result<Basket, tower_sessions::session::Error> {
        Ok(self
            .session
            .get::<Basket>(session_keys::PRODUCTS)
            .await?
            .unwrap_or_default())
    }

    /// Write the basket and its length.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn save(&self, basket: &Basket) -> Result<(), tower_sessions::session::Error> {
        self.session.insert(session_keys::PRODUCTS, basket).await?;
        self.session
            .insert(session_keys::PRODUCTS_COUNT, basket.len())
            .await
    }

    /// The stored item count for the header badge.
    ///
    /// This reads `products_count` as written by [`BasketSession::save`]; it
    /// is not recomputed from the list. Unreadable values count as zero.
    pub async fn count(&self) -> usize {
        self.session
            .get::<usize>(session_keys::PRODUCTS_COUNT)
            .await
            .ok()
            .flatten()
            .unwrap_or(0)
    }

    /// Remove both basket keys. Absent keys are not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn clear(&self) -> Result<(), tower_sessions::session::Error> {
        self.session.remove_value(session_keys::PRODUCTS).await?;
        self.session.remove_value(session_keys::PRODUCTS_COUNT).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_missing_basket_is_empty() {
        let session = session();
        let baskets = BasketSession::new(&session);
        assert!(baskets.load().await.unwrap().is_empty());
        assert_eq!(baskets.count().await, 0);
    }

    #[tokio::test]
    async fn test_save_writes_list_and_count() {
        let session = session();
        let baskets = BasketSession::new(&session);

        let mut basket = Basket::new();
        basket.add("1");
        basket.add("1");
        basket.add("2");
        baskets.save(&basket).await.unwrap();

        assert_eq!(baskets.load().await.unwrap(), basket);
        assert_eq!(baskets.count().await, 3);
        let raw: Vec<String> = session.get(session_keys::PRODUCTS).await.unwrap().unwrap();
        assert_eq!(raw, ["1", "1", "2"]);
    }

    #[tokio::test]
    async fn test_clear_removes_both_keys() {
        let session = session();
        let baskets = BasketSession::new(&session);

        let mut basket = Basket::new();
        basket.add("5");
        baskets.save(&basket).await.unwrap();
        baskets.clear().await.unwrap();

        assert!(session.get_value(session_keys::PRODUCTS).await.unwrap().is_none());
        assert!(session.get_value(session_keys::PRODUCTS_COUNT).await.unwrap().is_none());

        // Clearing again is a no-op
        baskets.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_count_is_not_recomputed() {
        let session = session();
        session.insert(session_keys::PRODUCTS, ["1", "2"]).await.unwrap();
        session.insert(session_keys::PRODUCTS_COUNT, 7_usize).await.unwrap();
        assert_eq!(BasketSession::new(&session).count().await, 7);
    }
}
