//! Random outfit selection.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::AppError;
use crate::models::{Category, Item, Outfit};
use crate::storage::ItemStorage;
use crate::user_models::UserIdentity;

/// Picks one item per recognized category for `owner`, using the thread RNG.
pub async fn random_outfit(storage: &ItemStorage, owner: &UserIdentity) -> Result<Outfit, AppError> {
    let tops = storage.list_by_owner_and_category(owner, Category::Top.as_str()).await;
    let bottoms = storage.list_by_owner_and_category(owner, Category::Bottom.as_str()).await;
    let shoes = storage.list_by_owner_and_category(owner, Category::Shoes.as_str()).await;

    pick_outfit(&tops, &bottoms, &shoes, &mut rand::thread_rng())
}

/// Draws one item uniformly from each bucket, independently. Fails without
/// producing anything if any bucket is empty.
pub fn pick_outfit<R: Rng + ?Sized>(
    tops: &[Item],
    bottoms: &[Item],
    shoes: &[Item],
    rng: &mut R,
) -> Result<Outfit, AppError> {
    let missing: Vec<&'static str> = [
        (Category::Top, tops),
        (Category::Bottom, bottoms),
        (Category::Shoes, shoes),
    ]
    .iter()
    .filter(|(_, bucket)| bucket.is_empty())
    .map(|(category, _)| category.as_str())
    .collect();

    match (tops.choose(rng), bottoms.choose(rng), shoes.choose(rng)) {
        (Some(top), Some(bottom), Some(shoe)) if missing.is_empty() => Ok(Outfit {
            top: top.clone(),
            bottom: bottom.clone(),
            shoes: shoe.clone(),
        }),
        _ => Err(AppError::InsufficientItems { missing }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uploads::ImageStore;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn owner() -> UserIdentity {
        UserIdentity {
            user_id: "u".into(),
            username: "u".into(),
        }
    }

    fn item(image: &str, category: &str) -> Item {
        Item::new(&owner(), image.into(), category.into())
    }

    #[test]
    fn single_item_buckets_are_always_chosen_and_tops_split_evenly() {
        let tops = vec![item("a.png", "top"), item("b.png", "top")];
        let bottoms = vec![item("c.png", "bottom")];
        let shoes = vec![item("d.png", "shoes")];
        let mut rng = StdRng::seed_from_u64(7);

        let trials = 4000;
        let mut a_count = 0;
        for _ in 0..trials {
            let outfit = pick_outfit(&tops, &bottoms, &shoes, &mut rng).unwrap();
            assert_eq!(outfit.bottom.image_path, "c.png");
            assert_eq!(outfit.shoes.image_path, "d.png");
            match outfit.top.image_path.as_str() {
                "a.png" => a_count += 1,
                "b.png" => {}
                other => panic!("unexpected top {other}"),
            }
        }

        let share = a_count as f64 / trials as f64;
        assert!((0.45..=0.55).contains(&share), "top a.png share was {share}");
    }

    #[test]
    fn empty_bucket_yields_insufficient_items() {
        let tops = vec![item("a.png", "top")];
        let bottoms = vec![item("c.png", "bottom")];
        let mut rng = StdRng::seed_from_u64(1);

        let err = pick_outfit(&tops, &bottoms, &[], &mut rng).unwrap_err();
        match err {
            AppError::InsufficientItems { missing } => assert_eq!(missing, vec!["shoes"]),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn all_empty_names_every_category() {
        let mut rng = StdRng::seed_from_u64(1);
        let err = pick_outfit(&[], &[], &[], &mut rng).unwrap_err();
        match err {
            AppError::InsufficientItems { missing } => {
                assert_eq!(missing, vec!["top", "bottom", "shoes"])
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn outfit_draws_only_from_callers_items() {
        let dir = tempfile::tempdir().unwrap();
        let storage = ItemStorage::new(dir.path().join("items.json")).unwrap();
        let images = ImageStore::new(dir.path().join("uploads"));
        let me = owner();
        let other = UserIdentity {
            user_id: "other".into(),
            username: "other".into(),
        };

        for (who, category) in [
            (&me, "top"),
            (&me, "bottom"),
            (&me, "shoes"),
            (&other, "top"),
            (&other, "bottom"),
            (&other, "shoes"),
        ] {
            let stored = images.save("x.png", b"x").unwrap();
            storage
                .create_item(who, &images, stored, category.into())
                .await
                .unwrap();
        }

        for _ in 0..20 {
            let outfit = random_outfit(&storage, &me).await.unwrap();
            assert_eq!(outfit.top.user_id, me.user_id);
            assert_eq!(outfit.bottom.user_id, me.user_id);
            assert_eq!(outfit.shoes.user_id, me.user_id);
            assert_eq!(outfit.top.category, "top");
            assert_eq!(outfit.bottom.category, "bottom");
            assert_eq!(outfit.shoes.category, "shoes");
        }
    }

    #[tokio::test]
    async fn other_users_items_do_not_fill_an_empty_bucket() {
        let dir = tempfile::tempdir().unwrap();
        let storage = ItemStorage::new(dir.path().join("items.json")).unwrap();
        let images = ImageStore::new(dir.path().join("uploads"));
        let me = owner();
        let other = UserIdentity {
            user_id: "other".into(),
            username: "other".into(),
        };

        for category in ["top", "bottom"] {
            let stored = images.save("x.png", b"x").unwrap();
            storage.create_item(&me, &images, stored, category.into()).await.unwrap();
        }
        let stored = images.save("x.png", b"x").unwrap();
        storage.create_item(&other, &images, stored, "shoes".into()).await.unwrap();

        let err = random_outfit(&storage, &me).await.unwrap_err();
        assert!(matches!(err, AppError::InsufficientItems { ref missing } if missing == &vec!["shoes"]));
    }
}
