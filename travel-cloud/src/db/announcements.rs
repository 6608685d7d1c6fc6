//! Announcement database operations
//!
//! Discount popups drive the linked tour's discount: every write that
//! changes an announcement's link or active flag updates the tour in the
//! same transaction. When a popup stops applying to a tour, the tour falls
//! back to the most recently updated discount popup still active on it.

use shared::models::{Announcement, AnnouncementCreate};
use sqlx::{PgConnection, PgPool};

use super::tours;

pub async fn list_all(pool: &PgPool) -> Result<Vec<Announcement>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM announcements ORDER BY created_at DESC, id DESC")
        .fetch_all(pool)
        .await
}

pub async fn list_active(pool: &PgPool) -> Result<Vec<Announcement>, sqlx::Error> {
    sqlx::query_as(
        "SELECT * FROM announcements WHERE is_active ORDER BY created_at DESC, id DESC",
    )
    .fetch_all(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Announcement>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM announcements WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create(
    pool: &PgPool,
    data: &AnnouncementCreate,
    now: i64,
) -> Result<Announcement, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let created: Announcement = sqlx::query_as(
        r#"
        INSERT INTO announcements (
            message, message_th, message_zh, kind, popup_type, tour_id,
            discount_percentage, link_url, is_active, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
        RETURNING *
        "#,
    )
    .bind(&data.message)
    .bind(&data.message_th)
    .bind(&data.message_zh)
    .bind(data.kind)
    .bind(data.popup_type)
    .bind(data.tour_id)
    .bind(data.discount_percentage)
    .bind(&data.link_url)
    .bind(data.is_active.unwrap_or(true))
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    sync_tour_discount(&mut tx, None, Some(&created), now).await?;
    tx.commit().await?;
    Ok(created)
}

/// Replace the stored row with `merged` (already validated by the caller)
pub async fn update(
    pool: &PgPool,
    merged: &Announcement,
    now: i64,
) -> Result<Option<Announcement>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let previous: Option<Announcement> =
        sqlx::query_as("SELECT * FROM announcements WHERE id = $1 FOR UPDATE")
            .bind(merged.id)
            .fetch_optional(&mut *tx)
            .await?;
    let Some(previous) = previous else {
        return Ok(None);
    };

    let updated: Announcement = sqlx::query_as(
        r#"
        UPDATE announcements SET
            message = $2, message_th = $3, message_zh = $4, kind = $5,
            popup_type = $6, tour_id = $7, discount_percentage = $8,
            link_url = $9, is_active = $10, updated_at = $11
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(merged.id)
    .bind(&merged.message)
    .bind(&merged.message_th)
    .bind(&merged.message_zh)
    .bind(merged.kind)
    .bind(merged.popup_type)
    .bind(merged.tour_id)
    .bind(merged.discount_percentage)
    .bind(&merged.link_url)
    .bind(merged.is_active)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    sync_tour_discount(&mut tx, Some(&previous), Some(&updated), now).await?;
    tx.commit().await?;
    Ok(Some(updated))
}

pub async fn delete(pool: &PgPool, id: i64, now: i64) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let removed: Option<Announcement> =
        sqlx::query_as("DELETE FROM announcements WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
    let Some(removed) = removed else {
        return Ok(false);
    };

    sync_tour_discount(&mut tx, Some(&removed), None, now).await?;
    tx.commit().await?;
    Ok(true)
}

/// Active discount link of an announcement state
fn active_link(a: Option<&Announcement>) -> Option<(i64, f64)> {
    a.filter(|a| a.is_active).and_then(Announcement::discount_link)
}

/// Tour discount changes implied by moving from `before` to `after`:
/// the tour to clear (if any) and the tour/percentage to set (if any).
fn discount_changes(
    before: Option<&Announcement>,
    after: Option<&Announcement>,
) -> (Option<i64>, Option<(i64, f64)>) {
    let old = active_link(before);
    let new = active_link(after);
    let clear = match (old, new) {
        (Some((old_tour, _)), Some((new_tour, _))) if old_tour == new_tour => None,
        (Some((old_tour, _)), _) => Some(old_tour),
        (None, _) => None,
    };
    (clear, new)
}

/// Discount still advertised for `tour_id` by `rows`, newest first
fn remaining_discount(rows: &[Announcement], tour_id: i64) -> Option<f64> {
    rows.iter()
        .filter_map(|a| active_link(Some(a)))
        .find(|(tour, _)| *tour == tour_id)
        .map(|(_, pct)| pct)
}

async fn sync_tour_discount(
    conn: &mut PgConnection,
    before: Option<&Announcement>,
    after: Option<&Announcement>,
    now: i64,
) -> Result<(), sqlx::Error> {
    let (clear, set) = discount_changes(before, after);
    if let Some(tour_id) = clear {
        let remaining: Vec<Announcement> = sqlx::query_as(
            "SELECT * FROM announcements
             WHERE tour_id = $1 AND is_active
             ORDER BY updated_at DESC, id DESC",
        )
        .bind(tour_id)
        .fetch_all(&mut *conn)
        .await?;
        let fallback = remaining_discount(&remaining, tour_id);
        tours::set_discount(&mut *conn, tour_id, fallback, now).await?;
        match fallback {
            Some(pct) => tracing::info!(
                tour_id,
                discount = pct,
                "Tour discount taken from remaining announcement"
            ),
            None => tracing::info!(tour_id, "Tour discount cleared by announcement"),
        }
    }
    if let Some((tour_id, pct)) = set {
        tours::set_discount(&mut *conn, tour_id, Some(pct), now).await?;
        tracing::info!(tour_id, discount = pct, "Tour discount set by announcement");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{AnnouncementType, PopupType};

    fn popup(tour_id: i64, pct: f64, active: bool) -> Announcement {
        Announcement {
            id: 1,
            message: "Sale".into(),
            message_th: None,
            message_zh: None,
            kind: AnnouncementType::Popup,
            popup_type: Some(PopupType::Discount),
            tour_id: Some(tour_id),
            discount_percentage: Some(pct),
            link_url: None,
            is_active: active,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_create_active_sets_discount() {
        let a = popup(7, 20.0, true);
        assert_eq!(discount_changes(None, Some(&a)), (None, Some((7, 20.0))));
    }

    #[test]
    fn test_create_inactive_does_nothing() {
        let a = popup(7, 20.0, false);
        assert_eq!(discount_changes(None, Some(&a)), (None, None));
    }

    #[test]
    fn test_deactivate_clears() {
        let before = popup(7, 20.0, true);
        let after = popup(7, 20.0, false);
        assert_eq!(discount_changes(Some(&before), Some(&after)), (Some(7), None));
    }

    #[test]
    fn test_percentage_change_on_same_tour() {
        let before = popup(7, 20.0, true);
        let after = popup(7, 30.0, true);
        assert_eq!(
            discount_changes(Some(&before), Some(&after)),
            (None, Some((7, 30.0)))
        );
    }

    #[test]
    fn test_moving_to_another_tour() {
        let before = popup(7, 20.0, true);
        let after = popup(9, 20.0, true);
        assert_eq!(
            discount_changes(Some(&before), Some(&after)),
            (Some(7), Some((9, 20.0)))
        );
    }

    #[test]
    fn test_delete_clears() {
        let before = popup(7, 20.0, true);
        assert_eq!(discount_changes(Some(&before), None), (Some(7), None));
    }

    #[test]
    fn test_other_popup_keeps_tour_discounted() {
        // A (20%) removed while B (15%) still targets tour 7
        let removed = popup(7, 20.0, true);
        assert_eq!(discount_changes(Some(&removed), None), (Some(7), None));

        let mut b = popup(7, 15.0, true);
        b.id = 2;
        assert_eq!(remaining_discount(&[b.clone()], 7), Some(15.0));

        let mut other_tour = popup(9, 30.0, true);
        other_tour.id = 3;
        let mut inactive = popup(7, 40.0, false);
        inactive.id = 4;
        assert_eq!(
            remaining_discount(&[other_tour.clone(), inactive.clone(), b], 7),
            Some(15.0)
        );
        assert_eq!(remaining_discount(&[other_tour, inactive], 7), None);
        assert_eq!(remaining_discount(&[], 7), None);
    }

    #[test]
    fn test_non_discount_popup_ignored() {
        let mut info = popup(7, 20.0, true);
        info.popup_type = Some(PopupType::Info);
        assert_eq!(discount_changes(None, Some(&info)), (None, None));
    }
}
