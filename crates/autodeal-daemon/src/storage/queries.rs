//! Database queries for the `AutoDeal` daemon.

use autodeal_core::db::unix_timestamp;
use autodeal_core::offer::{OfferParty, OfferStatus};

use super::db::{Database, DatabaseError};
use super::models::{ListingRow, OfferRow, ProfileRow};

/// Parameters for creating a listing.
#[derive(Debug, Clone)]
pub struct NewListing {
    pub id: String,
    pub seller_id: String,
    pub title: String,
    pub price_cents: i64,
    pub year: i64,
    pub mileage: i64,
    pub location: String,
    pub description: String,
    pub features: Vec<String>,
}

impl Database {
    // =========================================================================
    // Profile queries
    // =========================================================================

    /// Create a new profile.
    pub async fn create_profile(
        &self,
        id: &str,
        name: &str,
        phone: &str,
    ) -> Result<ProfileRow, DatabaseError> {
        let now = unix_timestamp();

        sqlx::query(
            r"
            INSERT INTO profiles (id, name, phone, created_at)
            VALUES (?, ?, ?, ?)
            ",
        )
        .bind(id)
        .bind(name)
        .bind(phone)
        .bind(now)
        .execute(self.pool())
        .await?;

        self.get_profile(id).await
    }

    /// Get a profile by ID.
    pub async fn get_profile(&self, id: &str) -> Result<ProfileRow, DatabaseError> {
        sqlx::query_as::<_, ProfileRow>("SELECT * FROM profiles WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Profile {id}")))
    }

    /// Find a profile by phone number, if one exists.
    pub async fn find_profile_by_phone(
        &self,
        phone: &str,
    ) -> Result<Option<ProfileRow>, DatabaseError> {
        let profile = sqlx::query_as::<_, ProfileRow>("SELECT * FROM profiles WHERE phone = ?")
            .bind(phone)
            .fetch_optional(self.pool())
            .await?;

        Ok(profile)
    }

    // =========================================================================
    // Listing queries
    // =========================================================================

    /// Create a new listing.
    pub async fn create_listing(&self, params: &NewListing) -> Result<ListingRow, DatabaseError> {
        let now = unix_timestamp();
        let features = serde_json::to_string(&params.features)
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        sqlx::query(
            r"
            INSERT INTO listings
                (id, seller_id, title, price_cents, year, mileage, location, description, features, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(&params.id)
        .bind(&params.seller_id)
        .bind(&params.title)
        .bind(params.price_cents)
        .bind(params.year)
        .bind(params.mileage)
        .bind(&params.location)
        .bind(&params.description)
        .bind(features)
        .bind(now)
        .execute(self.pool())
        .await?;

        self.get_listing(&params.id).await
    }

    /// Get a listing by ID.
    pub async fn get_listing(&self, id: &str) -> Result<ListingRow, DatabaseError> {
        sqlx::query_as::<_, ListingRow>("SELECT * FROM listings WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Listing {id}")))
    }

    /// List listings, newest first.
    pub async fn list_listings(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<ListingRow>, DatabaseError> {
        let listings = sqlx::query_as::<_, ListingRow>(
            "SELECT * FROM listings ORDER BY created_at DESC LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool())
        .await?;

        Ok(listings)
    }

    // =========================================================================
    // Offer ledger queries
    // =========================================================================

    /// Append a pending offer to a listing's ledger, returning its id.
    ///
    /// The ledger position (`seq`) is assigned inside the statement so two
    /// concurrent appends cannot claim the same slot.
    pub async fn insert_offer(
        &self,
        listing_id: &str,
        buyer_id: &str,
        party: OfferParty,
        amount_cents: i64,
        message: &str,
    ) -> Result<i64, DatabaseError> {
        let now = unix_timestamp();

        let result = sqlx::query(
            r"
            INSERT INTO offers (listing_id, seq, buyer_id, party, amount_cents, status, message, created_at)
            VALUES (
                ?,
                (SELECT COALESCE(MAX(seq), 0) + 1 FROM offers WHERE listing_id = ?),
                ?, ?, ?, 'pending', ?, ?
            )
            ",
        )
        .bind(listing_id)
        .bind(listing_id)
        .bind(buyer_id)
        .bind(party.as_str())
        .bind(amount_cents)
        .bind(message)
        .bind(now)
        .execute(self.pool())
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Get an offer by ID.
    pub async fn get_offer(&self, id: i64) -> Result<OfferRow, DatabaseError> {
        sqlx::query_as::<_, OfferRow>("SELECT * FROM offers WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Offer {id}")))
    }

    /// Compare-and-set an offer's status from `pending` to a terminal state.
    ///
    /// Returns the number of rows updated: 0 means the offer was missing or
    /// no longer pending, so two concurrent decisions cannot both succeed.
    pub async fn resolve_offer(
        &self,
        id: i64,
        target: OfferStatus,
    ) -> Result<u64, DatabaseError> {
        let result = sqlx::query("UPDATE offers SET status = ? WHERE id = ? AND status = 'pending'")
            .bind(target.as_str())
            .bind(id)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected())
    }

    /// A listing's full ledger, in submission order.
    pub async fn list_offers(&self, listing_id: &str) -> Result<Vec<OfferRow>, DatabaseError> {
        let offers =
            sqlx::query_as::<_, OfferRow>("SELECT * FROM offers WHERE listing_id = ? ORDER BY seq ASC")
                .bind(listing_id)
                .fetch_all(self.pool())
                .await?;

        Ok(offers)
    }

    /// Count pending offers on a listing.
    pub async fn pending_offer_count(&self, listing_id: &str) -> Result<i64, DatabaseError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM offers WHERE listing_id = ? AND status = 'pending'",
        )
        .bind(listing_id)
        .fetch_one(self.pool())
        .await?;

        Ok(count)
    }

    /// Whether an accepted offer links two users, in either orientation.
    pub async fn has_accepted_offer_between(
        &self,
        user_id: &str,
        other_user_id: &str,
    ) -> Result<bool, DatabaseError> {
        let exists: i64 = sqlx::query_scalar(
            r"
            SELECT EXISTS (
                SELECT 1 FROM offers o
                JOIN listings l ON l.id = o.listing_id
                WHERE o.status = 'accepted'
                  AND ((o.buyer_id = ? AND l.seller_id = ?)
                    OR (o.buyer_id = ? AND l.seller_id = ?))
            )
            ",
        )
        .bind(user_id)
        .bind(other_user_id)
        .bind(other_user_id)
        .bind(user_id)
        .fetch_one(self.pool())
        .await?;

        Ok(exists != 0)
    }
}
