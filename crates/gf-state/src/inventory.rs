//! Owned character inventory

use std::sync::Arc;

use gf_core::{Item, ItemId, Rarity};

/// Items a player owns, in acquisition order. Duplicates are kept.
pub trait Inventory: Send {
    fn add(&mut self, item: Arc<Item>);

    fn items(&self) -> &[Arc<Item>];

    fn count_of(&self, id: &ItemId) -> usize {
        self.items().iter().filter(|item| &item.id == id).count()
    }

    fn contains(&self, id: &ItemId) -> bool {
        self.items().iter().any(|item| &item.id == id)
    }

    fn len(&self) -> usize {
        self.items().len()
    }

    fn is_empty(&self) -> bool {
        self.items().is_empty()
    }
}

/// In-memory inventory
#[derive(Debug, Clone, Default)]
pub struct MemoryInventory {
    items: Vec<Arc<Item>>,
}

impl MemoryInventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Owned items of a given tier
    pub fn of_rarity(&self, rarity: Rarity) -> impl Iterator<Item = &Arc<Item>> {
        self.items.iter().filter(move |item| item.rarity == rarity)
    }

    /// Distinct item ids, first-acquired order
    pub fn unique_ids(&self) -> Vec<ItemId> {
        let mut seen: Vec<ItemId> = Vec::new();
        for item in &self.items {
            if !seen.contains(&item.id) {
                seen.push(item.id.clone());
            }
        }
        seen
    }
}

impl Inventory for MemoryInventory {
    fn add(&mut self, item: Arc<Item>) {
        self.items.push(item);
    }

    fn items(&self) -> &[Arc<Item>] {
        &self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_count_duplicates() {
        let slime = Arc::new(Item::new("slime", "Slime", Rarity::Common));
        let dragon = Arc::new(Item::new("dragon", "Dragon", Rarity::Legendary));

        let mut inv = MemoryInventory::new();
        inv.add(Arc::clone(&slime));
        inv.add(Arc::clone(&dragon));
        inv.add(Arc::clone(&slime));

        assert_eq!(inv.len(), 3);
        assert_eq!(inv.count_of(&slime.id), 2);
        assert!(inv.contains(&dragon.id));
        assert!(!inv.contains(&ItemId::from("golem")));
        assert_eq!(inv.unique_ids(), vec![slime.id.clone(), dragon.id.clone()]);
        assert_eq!(inv.of_rarity(Rarity::Legendary).count(), 1);
    }
}
