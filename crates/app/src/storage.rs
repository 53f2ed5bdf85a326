//! Cart snapshot storage.
//!
//! The cart is owned by a single client session and written out after every
//! mutation, so a later session can restore it. Last writer wins; there is
//! no cross-session coordination.

use std::{fs, io, path::PathBuf};

use arbor::cart::{Cart, NewCartLine};
use mockall::automock;
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

/// Errors persisting the cart snapshot.
#[derive(Debug, Error)]
pub enum CartStoreError {
    /// The snapshot file could not be read or written.
    #[error("cart snapshot io error")]
    Io(#[from] io::Error),

    /// The cart could not be encoded as a snapshot.
    #[error("cart snapshot encoding error")]
    Encode(#[from] serde_json::Error),
}

/// Durable storage for the cart snapshot.
#[automock]
pub trait CartStore: Send + Sync {
    /// Load the saved cart.
    ///
    /// A missing or unreadable snapshot is an empty cart, never an error —
    /// a corrupt snapshot should not strand the storefront.
    fn load(&self) -> Cart;

    /// Persist the cart after a mutation.
    ///
    /// # Errors
    ///
    /// Returns a [`CartStoreError`] if the snapshot cannot be written.
    fn save(&self, cart: &Cart) -> Result<(), CartStoreError>;

    /// Remove the snapshot, after a successful order placement.
    ///
    /// # Errors
    ///
    /// Returns a [`CartStoreError`] if the snapshot cannot be removed.
    fn clear(&self) -> Result<(), CartStoreError>;
}

/// File-backed cart store holding one JSON snapshot.
#[derive(Debug, Clone)]
pub struct FileCartStore {
    path: PathBuf,
}

impl FileCartStore {
    /// Create a store writing to the given path.
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl CartStore for FileCartStore {
    fn load(&self) -> Cart {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Cart::new(),
            Err(error) => {
                warn!("failed to read cart snapshot, starting empty: {error}");
                return Cart::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(cart) => cart,
            Err(error) => {
                warn!("failed to decode cart snapshot, starting empty: {error}");
                Cart::new()
            }
        }
    }

    fn save(&self, cart: &Cart) -> Result<(), CartStoreError> {
        let encoded = serde_json::to_string(cart)?;

        fs::write(&self.path, encoded)?;

        Ok(())
    }

    fn clear(&self) -> Result<(), CartStoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error.into()),
        }
    }
}

/// A cart bound to its snapshot store.
///
/// Every mutation is written through to the store, so a later session can
/// restore exactly what the customer left behind.
#[derive(Debug)]
pub struct StoredCart<S> {
    cart: Cart,
    store: S,
}

impl<S: CartStore> StoredCart<S> {
    /// Open the cart, restoring the saved snapshot if one exists.
    pub fn open(store: S) -> Self {
        let cart = store.load();

        Self { cart, store }
    }

    /// The current cart contents.
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Add a product and persist.
    ///
    /// # Errors
    ///
    /// Returns a [`CartStoreError`] if the snapshot cannot be written; the
    /// in-memory mutation stands either way.
    pub fn add(&mut self, line: NewCartLine) -> Result<(), CartStoreError> {
        self.cart.add(line);

        self.store.save(&self.cart)
    }

    /// Change a line's quantity and persist.
    ///
    /// # Errors
    ///
    /// Returns a [`CartStoreError`] if the snapshot cannot be written.
    pub fn set_quantity(&mut self, product_id: Uuid, quantity: u32) -> Result<(), CartStoreError> {
        self.cart.set_quantity(product_id, quantity);

        self.store.save(&self.cart)
    }

    /// Remove a line and persist.
    ///
    /// # Errors
    ///
    /// Returns a [`CartStoreError`] if the snapshot cannot be written.
    pub fn remove(&mut self, product_id: Uuid) -> Result<(), CartStoreError> {
        self.cart.remove(product_id);

        self.store.save(&self.cart)
    }

    /// Empty the cart and drop the snapshot.
    ///
    /// # Errors
    ///
    /// Returns a [`CartStoreError`] if the snapshot cannot be removed.
    pub fn clear(&mut self) -> Result<(), CartStoreError> {
        self.cart.clear();

        self.store.clear()
    }
}
