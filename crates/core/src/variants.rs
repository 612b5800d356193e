//! Variants
//!
//! Products vary along axes (colour, size, …); each axis is a
//! [`VariantGroup`] and every point in the Cartesian product of the groups'
//! options is a sellable [`VariantCombination`]. Regeneration preserves
//! combinations that survive a group change, matched by canonical key, and
//! synthesises defaults for the rest.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use uuid::Uuid;

/// Currency code used for defaulted combination prices.
const DEFAULT_CURRENCY: &str = "TRY";

/// Locale used for defaulted combination translations.
const DEFAULT_LOCALE: &str = "tr";

/// Length each option contributes to a generated SKU.
const SKU_OPTION_LEN: usize = 4;

/// Hex digits of the product id kept in a generated SKU.
const SKU_PRODUCT_LEN: usize = 8;

/// One selectable option within a variant group.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantOption {
    /// Option identifier.
    pub uuid: Uuid,
    /// Display name, e.g. "Kırmızı" or "XL".
    pub name: String,
}

/// One axis of product variation and its options.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantGroup {
    /// Group identifier.
    pub uuid: Uuid,
    /// The group's options, in display order.
    pub options: Vec<VariantOption>,
}

/// A single (group, option) pick within a combination.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantSelection {
    /// The variant group picked from.
    pub group: Uuid,
    /// The option picked.
    pub option: Uuid,
}

/// A price entry on a combination, in minor units.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantPrice {
    /// ISO currency code.
    pub currency: String,
    /// Amount in minor units.
    pub amount: u64,
}

/// A translated text entry on a combination.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantTranslation {
    /// Locale code, e.g. "tr".
    pub locale: String,
    /// Translated display name.
    pub name: String,
    /// Translated description.
    pub description: String,
}

/// One sellable point in the Cartesian product of a product's groups.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantCombination {
    /// One selection per variant group, in group order.
    pub selections: SmallVec<[VariantSelection; 4]>,
    /// Stock-keeping unit.
    pub sku: String,
    /// Barcode, when assigned.
    pub barcode: Option<String>,
    /// Price entries.
    pub prices: Vec<VariantPrice>,
    /// Units in stock.
    pub stock: u32,
    /// Whether the combination is sellable.
    pub active: bool,
    /// Translated texts.
    pub translations: Vec<VariantTranslation>,
}

/// The canonical identity of a combination: its selections sorted by group
/// id and rendered `"group:option"`, joined with `|`. Stable under group
/// reordering, so old and new combinations match regardless of how the
/// group list was rearranged.
#[must_use]
pub fn canonical_key(selections: &[VariantSelection]) -> String {
    let mut pairs: Vec<&VariantSelection> = selections.iter().collect();
    pairs.sort_by_key(|selection| selection.group);

    let rendered: Vec<String> = pairs
        .iter()
        .map(|selection| format!("{}:{}", selection.group, selection.option))
        .collect();

    rendered.join("|")
}

/// Regenerates the combination set for a product after its variant groups
/// changed.
///
/// Groups are deduplicated by id (first occurrence wins) and the Cartesian
/// product of their options is walked with the first group varying slowest.
/// Prior combinations are kept verbatim when their canonical key still
/// exists in the new product, except their selections, which are always
/// overwritten with the freshly computed pairs so stale ids cannot linger.
/// Prior combinations referencing a removed group or option, or with the
/// wrong number of selections, are dropped. New points get a default
/// record: generated SKU, no barcode, a single zero price in TRY, zero
/// stock, active, and one empty `tr` translation.
///
/// An empty group list yields an empty combination set.
#[must_use]
pub fn generate_combinations(
    groups: &[VariantGroup],
    existing: &[VariantCombination],
    product: Uuid,
) -> Vec<VariantCombination> {
    let groups = dedup_groups(groups);

    if groups.is_empty() {
        return Vec::new();
    }

    let prior = index_valid_priors(&groups, existing);

    cartesian(&groups)
        .into_iter()
        .map(|selections| match prior.get(&canonical_key(&selections)) {
            Some(kept) => VariantCombination {
                selections,
                ..(*kept).clone()
            },
            None => default_combination(product, &groups, selections),
        })
        .collect()
}

/// Collapse repeated groups to their first occurrence, preserving order.
fn dedup_groups(groups: &[VariantGroup]) -> Vec<&VariantGroup> {
    let mut seen = FxHashSet::default();

    groups
        .iter()
        .filter(|group| seen.insert(group.uuid))
        .collect()
}

/// Cartesian product of the groups' options, first group slowest-varying.
///
/// Combinations of the tail are computed first; each head option is then
/// prefixed onto every tail combination.
fn cartesian(groups: &[&VariantGroup]) -> Vec<SmallVec<[VariantSelection; 4]>> {
    let Some((head, tail)) = groups.split_first() else {
        return vec![SmallVec::new()];
    };

    let tail_combinations = cartesian(tail);

    head.options
        .iter()
        .flat_map(|option| {
            let selection = VariantSelection {
                group: head.uuid,
                option: option.uuid,
            };

            tail_combinations.iter().map(move |tail_combination| {
                let mut combination = SmallVec::with_capacity(tail_combination.len() + 1);
                combination.push(selection);
                combination.extend(tail_combination.iter().copied());
                combination
            })
        })
        .collect()
}

/// Index prior combinations by canonical key, discarding any that no
/// longer fit the current group set. Invalid priors are dropped whole, not
/// repaired.
fn index_valid_priors<'e>(
    groups: &[&VariantGroup],
    existing: &'e [VariantCombination],
) -> FxHashMap<String, &'e VariantCombination> {
    let options_by_group: FxHashMap<Uuid, FxHashSet<Uuid>> = groups
        .iter()
        .map(|group| {
            (
                group.uuid,
                group.options.iter().map(|option| option.uuid).collect(),
            )
        })
        .collect();

    existing
        .iter()
        .filter(|combination| {
            combination.selections.len() == groups.len()
                && combination.selections.iter().all(|selection| {
                    options_by_group
                        .get(&selection.group)
                        .is_some_and(|options| options.contains(&selection.option))
                })
        })
        .map(|combination| (canonical_key(&combination.selections), combination))
        .collect()
}

/// Synthesise the default record for a combination that has no prior.
fn default_combination(
    product: Uuid,
    groups: &[&VariantGroup],
    selections: SmallVec<[VariantSelection; 4]>,
) -> VariantCombination {
    VariantCombination {
        sku: generate_sku(product, groups, &selections),
        selections,
        barcode: None,
        prices: vec![VariantPrice {
            currency: DEFAULT_CURRENCY.to_string(),
            amount: 0,
        }],
        stock: 0,
        active: true,
        translations: vec![VariantTranslation {
            locale: DEFAULT_LOCALE.to_string(),
            name: String::new(),
            description: String::new(),
        }],
    }
}

/// Build a SKU: the tail of the product id, then one shortened code per
/// selected option, all uppercased and joined with `-`.
fn generate_sku(
    product: Uuid,
    groups: &[&VariantGroup],
    selections: &[VariantSelection],
) -> String {
    let product_hex = product.simple().to_string();

    let product_part: String = product_hex
        .chars()
        .skip(product_hex.chars().count().saturating_sub(SKU_PRODUCT_LEN))
        .flat_map(char::to_uppercase)
        .collect();

    let mut parts = vec![product_part];

    for selection in selections {
        let name = groups
            .iter()
            .find(|group| group.uuid == selection.group)
            .and_then(|group| {
                group
                    .options
                    .iter()
                    .find(|option| option.uuid == selection.option)
            })
            .map_or("", |option| option.name.as_str());

        parts.push(sku_option_code(name));
    }

    parts.join("-")
}

/// Strip an option name to alphanumerics (Unicode-aware, so Turkish
/// letters survive), truncate, uppercase.
fn sku_option_code(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .take(SKU_OPTION_LEN)
        .flat_map(char::to_uppercase)
        .collect()
}
