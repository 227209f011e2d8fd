use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// Menu category. Serialized names match the storefront's stored data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Salgados,
    Sortidos,
    Assados,
    Especiais,
    Opcionais,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::Salgados => "Salgados Fritos",
            Category::Sortidos => "Sortidos",
            Category::Assados => "Assados",
            Category::Especiais => "Especiais",
            Category::Opcionais => "Opcionais",
        }
    }
}

/// How a quantity of an item is ordered.
///
/// Non-portioned items are priced per "cento" (batch of 100 units); portioned
/// items are sold as single portions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuantityTier {
    #[serde(rename = "cento")]
    Cento,
    #[serde(rename = "meio-cento")]
    MeioCento,
    #[serde(rename = "unidade")]
    Unidade,
    #[serde(rename = "porção")]
    Porcao,
}

impl QuantityTier {
    pub fn label(&self) -> &'static str {
        match self {
            QuantityTier::Cento => "Cento",
            QuantityTier::MeioCento => "Meio cento",
            QuantityTier::Unidade => "Unidades",
            QuantityTier::Porcao => "Porção",
        }
    }
}

impl std::fmt::Display for QuantityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Minimum unit count when ordering loose units.
pub const MIN_UNIT_COUNT: u32 = 10;

/// A menu item. Built-in items are fixed definitions seeded at startup and are
/// never mutated; admin edits to them live in [`ItemOverride`] records merged
/// at read time. Custom items carry `is_custom = true` and may be edited or
/// deleted directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: u32,
    pub name: String,
    pub unit_price: Decimal,
    pub category: Category,
    #[serde(default)]
    pub is_portioned: bool,
    #[serde(default)]
    pub is_custom: bool,
    #[serde(default)]
    pub description: Option<String>,
}

impl MenuItem {
    /// Line price for one order of `tier` on this item.
    ///
    /// `unit_count` is only meaningful for [`QuantityTier::Unidade`] and must
    /// be at least [`MIN_UNIT_COUNT`]; the minimum is a business rule, so
    /// values below it are rejected rather than raised.
    pub fn price_for_tier(
        &self,
        tier: QuantityTier,
        unit_count: u32,
    ) -> Result<Decimal, CatalogError> {
        match tier {
            QuantityTier::Cento | QuantityTier::MeioCento | QuantityTier::Unidade
                if self.is_portioned =>
            {
                Err(CatalogError::InvalidTierForItem {
                    item: self.name.clone(),
                    tier,
                })
            }
            QuantityTier::Porcao if !self.is_portioned => Err(CatalogError::InvalidTierForItem {
                item: self.name.clone(),
                tier,
            }),
            QuantityTier::Cento => Ok(self.unit_price),
            QuantityTier::MeioCento => Ok(self.unit_price / Decimal::TWO),
            QuantityTier::Unidade => {
                if unit_count < MIN_UNIT_COUNT {
                    return Err(CatalogError::ValidationError(format!(
                        "minimum of {} units per order, got {}",
                        MIN_UNIT_COUNT, unit_count
                    )));
                }
                Ok(self.unit_price / Decimal::ONE_HUNDRED * Decimal::from(unit_count))
            }
            QuantityTier::Porcao => Ok(self.unit_price),
        }
    }
}

/// Payload for creating a custom menu item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItemCreate {
    pub name: String,
    pub unit_price: Decimal,
    pub category: Category,
    pub is_portioned: bool,
    pub description: Option<String>,
}

/// Field-level update for a menu item. Every mutable field is named
/// explicitly; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MenuItemPatch {
    pub name: Option<String>,
    pub unit_price: Option<Decimal>,
    pub category: Option<Category>,
    pub is_portioned: Option<bool>,
    pub description: Option<Option<String>>,
}

impl MenuItemPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.unit_price.is_none()
            && self.category.is_none()
            && self.is_portioned.is_none()
            && self.description.is_none()
    }

    /// Applies the patch to `item` in place.
    pub fn apply_to(&self, item: &mut MenuItem) {
        if let Some(name) = &self.name {
            item.name = name.clone();
        }
        if let Some(price) = self.unit_price {
            item.unit_price = price;
        }
        if let Some(category) = self.category {
            item.category = category;
        }
        if let Some(portioned) = self.is_portioned {
            item.is_portioned = portioned;
        }
        if let Some(description) = &self.description {
            item.description = description.clone();
        }
    }

    /// Merges `other` on top of this patch, so the newest edit wins per field.
    pub fn merge(&mut self, other: MenuItemPatch) {
        if other.name.is_some() {
            self.name = other.name;
        }
        if other.unit_price.is_some() {
            self.unit_price = other.unit_price;
        }
        if other.category.is_some() {
            self.category = other.category;
        }
        if other.is_portioned.is_some() {
            self.is_portioned = other.is_portioned;
        }
        if other.description.is_some() {
            self.description = other.description;
        }
    }
}

/// Stored override for a built-in item, keyed by item id. The base definition
/// is never mutated; the override is applied on every read.
pub type ItemOverride = MenuItemPatch;

fn brl(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

fn item(
    id: u32,
    name: &str,
    cents: i64,
    category: Category,
    description: &str,
) -> MenuItem {
    MenuItem {
        id,
        name: name.to_string(),
        unit_price: brl(cents),
        category,
        is_portioned: false,
        is_custom: false,
        description: Some(description.to_string()),
    }
}

/// The fixed built-in menu.
pub fn builtin_menu() -> Vec<MenuItem> {
    use Category::*;
    let mut items = vec![
        item(1, "Bolinha de queijo", 11000, Salgados, "Deliciosas bolinhas de queijo douradas"),
        item(2, "Coxinha frango", 11000, Salgados, "Coxinha tradicional de frango"),
        item(3, "Coxinha brócolis/queijo", 11000, Salgados, "Coxinha especial de brócolis com queijo"),
        item(4, "Bombinha calabresa/queijo", 11000, Salgados, "Bombinha recheada com calabresa e queijo"),
        item(5, "Enroladinho de salsicha", 11000, Salgados, "Massa crocante envolvendo salsicha"),
        item(6, "Croquetes", 11000, Salgados, "Croquetes dourados e crocantes"),
        item(7, "Pastel simples (gado/frango/queijo)", 10000, Salgados, "Pastel tradicional com recheios variados"),
        item(8, "Travesseirinho de gado", 11000, Salgados, "Travesseirinho recheado com carne"),
        item(9, "Risoles de gado", 12000, Salgados, "Risoles cremosos de carne"),
        item(10, "Risoles frango", 12000, Salgados, "Risoles cremosos de frango"),
        item(11, "Barquetes (legumes ou frango)", 18000, Sortidos, "Barquetes delicados com recheios especiais"),
        item(12, "Canudinhos (legumes ou frango)", 12000, Sortidos, "Canudinhos crocantes com recheio saboroso"),
        item(13, "Torradinhas", 17000, Sortidos, "Torradinhas douradas e temperadas"),
        item(14, "Espetinho", 18000, Sortidos, "Espetinhos variados para petiscar"),
        item(15, "Mini Pizza", 16000, Sortidos, "Mini pizzas com coberturas diversas"),
        item(16, "Mini Sanduíches", 16000, Sortidos, "Mini sanduíches perfeitos para festas"),
        item(17, "Presunto e Queijo", 16000, Assados, "Salgado assado com presunto e queijo"),
        item(18, "Gado", 16000, Assados, "Salgado assado com recheio de carne"),
        item(19, "Frango", 16000, Assados, "Salgado assado com recheio de frango"),
        item(20, "Legumes", 16000, Assados, "Salgado assado com mix de legumes"),
        item(21, "Brócolis c/ Ricota", 16000, Assados, "Salgado assado com brócolis e ricota"),
        item(22, "Palmito", 16000, Assados, "Salgado assado com palmito"),
        item(23, "Mini Cachorro Quente", 22000, Especiais, "Mini hot dogs completos"),
        item(24, "Mini Hambúrguer", 22000, Especiais, "Mini hambúrgueres gourmet"),
        item(25, "Empadinhas", 20000, Especiais, "Empadinhas tradicionais com recheios variados"),
        item(26, "Batata Frita (Porção)", 650, Opcionais, "Porção de batata frita sequinha"),
    ];
    // The only portioned built-in.
    if let Some(fries) = items.last_mut() {
        fries.is_portioned = true;
    }
    items
}
