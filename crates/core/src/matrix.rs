//! Size x color variant matrix reconciliation for the admin editor.
//!
//! The admin product form drafts two free-text option sets (sizes, colors)
//! and a sparse variant list. This module keeps the three consistent while
//! an operator edits: at most one variant per (size, color) pair, and no
//! variant outside the declared sets. Orphans are pruned automatically
//! whenever either option set changes, so the matrix rendered from
//! `sizes x colors` is always the single source of truth for which cells
//! are enabled.
//!
//! Synchronous, in-memory, single editing session - there is no
//! concurrent-editor conflict resolution here.

use serde::{Deserialize, Serialize};

use crate::product::Variant;

/// Draft state of the admin variant editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct VariantMatrix {
    sizes: Vec<String>,
    colors: Vec<String>,
    variants: Vec<Variant>,
}

impl VariantMatrix {
    /// Build a matrix from persisted product data.
    ///
    /// Re-establishes the invariants on untrusted input: duplicate
    /// (size, color) records keep the first occurrence, and orphans are
    /// pruned immediately.
    #[must_use]
    pub fn new(sizes: Vec<String>, colors: Vec<String>, variants: Vec<Variant>) -> Self {
        let mut matrix = Self {
            sizes: dedup_labels(sizes),
            colors: dedup_labels(colors),
            variants: Vec::with_capacity(variants.len()),
        };
        for v in variants {
            if matrix.find(&v.size, &v.color).is_none() {
                matrix.variants.push(v);
            }
        }
        matrix.prune_orphans();
        matrix
    }

    /// The declared size labels, in order.
    #[must_use]
    pub fn sizes(&self) -> &[String] {
        &self.sizes
    }

    /// The declared color labels, in order.
    #[must_use]
    pub fn colors(&self) -> &[String] {
        &self.colors
    }

    /// The current variant records.
    #[must_use]
    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    /// Consume the matrix, yielding the variant list for persistence.
    #[must_use]
    pub fn into_parts(self) -> (Vec<String>, Vec<String>, Vec<Variant>) {
        (self.sizes, self.colors, self.variants)
    }

    /// The variant for a (size, color) cell, if enabled.
    #[must_use]
    pub fn get(&self, size: &str, color: &str) -> Option<&Variant> {
        self.variants.iter().find(|v| v.matches(size, color))
    }

    /// Replace the size set from free-text comma-separated input.
    ///
    /// Entries are trimmed, empties dropped, duplicates removed keeping the
    /// first occurrence. Variants orphaned by the change are pruned.
    pub fn set_sizes(&mut self, input: &str) {
        self.sizes = parse_labels(input);
        self.prune_orphans();
    }

    /// Replace the color set from free-text comma-separated input.
    ///
    /// Same parsing and pruning rules as [`Self::set_sizes`].
    pub fn set_colors(&mut self, input: &str) {
        self.colors = parse_labels(input);
        self.prune_orphans();
    }

    /// Toggle a matrix cell: remove the variant if present, otherwise
    /// insert a zero-stock one.
    ///
    /// Inserting a pair outside the declared sets is a no-op; cells are
    /// only ever rendered from `sizes x colors`, so such a request can only
    /// come from a stale form.
    pub fn toggle_cell(&mut self, size: &str, color: &str) {
        if let Some(idx) = self.find(size, color) {
            self.variants.remove(idx);
        } else if self.declares(size, color) {
            self.variants.push(Variant::empty(size, color));
        }
    }

    /// Update the stock of an enabled cell from free-text input.
    ///
    /// Invalid or negative input clamps to 0. No-op when the cell has no
    /// variant; the editor toggles the cell on first.
    pub fn set_stock(&mut self, size: &str, color: &str, raw: &str) {
        let stock = raw
            .trim()
            .parse::<i64>()
            .ok()
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(0);
        if let Some(idx) = self.find(size, color)
            && let Some(v) = self.variants.get_mut(idx)
        {
            v.stock = stock;
        }
    }

    /// Update the SKU of an enabled cell; empty input clears it.
    ///
    /// No-op when the cell has no variant.
    pub fn set_sku(&mut self, size: &str, color: &str, sku: &str) {
        if let Some(idx) = self.find(size, color)
            && let Some(v) = self.variants.get_mut(idx)
        {
            let sku = sku.trim();
            v.sku = if sku.is_empty() {
                None
            } else {
                Some(sku.to_owned())
            };
        }
    }

    /// Insert a zero-stock variant for every (size, color) pair that lacks
    /// one. Pairs already present are left untouched; idempotent.
    pub fn generate_all(&mut self) {
        for size in self.sizes.clone() {
            for color in self.colors.clone() {
                if self.find(&size, &color).is_none() {
                    self.variants.push(Variant::empty(size.clone(), color));
                }
            }
        }
    }

    /// Drop all variants. The declared option sets are untouched.
    pub fn clear(&mut self) {
        self.variants.clear();
    }

    /// Remove every variant whose size or color fell outside the current
    /// option sets.
    pub fn prune_orphans(&mut self) {
        let (sizes, colors) = (&self.sizes, &self.colors);
        self.variants
            .retain(|v| sizes.contains(&v.size) && colors.contains(&v.color));
    }

    fn find(&self, size: &str, color: &str) -> Option<usize> {
        self.variants.iter().position(|v| v.matches(size, color))
    }

    fn declares(&self, size: &str, color: &str) -> bool {
        self.sizes.iter().any(|s| s == size) && self.colors.iter().any(|c| c == color)
    }
}

/// Parse a free-text comma-separated label list: trim, drop empties,
/// dedup keeping the first occurrence.
#[must_use]
pub fn parse_labels(input: &str) -> Vec<String> {
    let mut labels: Vec<String> = Vec::new();
    for part in input.split(',') {
        let label = part.trim();
        if !label.is_empty() && !labels.iter().any(|l| l == label) {
            labels.push(label.to_owned());
        }
    }
    labels
}

fn dedup_labels(labels: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(labels.len());
    for label in labels {
        let trimmed = label.trim();
        if !trimmed.is_empty() && !out.iter().any(|l| l == trimmed) {
            out.push(trimmed.to_owned());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(sizes: &str, colors: &str) -> VariantMatrix {
        let mut m = VariantMatrix::default();
        m.set_sizes(sizes);
        m.set_colors(colors);
        m
    }

    fn pairs(m: &VariantMatrix) -> Vec<(String, String)> {
        m.variants()
            .iter()
            .map(|v| (v.size.clone(), v.color.clone()))
            .collect()
    }

    #[test]
    fn test_parse_labels() {
        assert_eq!(parse_labels("S, M ,L"), vec!["S", "M", "L"]);
        assert_eq!(parse_labels(" S,, M, S "), vec!["S", "M"]);
        assert_eq!(parse_labels(""), Vec::<String>::new());
        assert_eq!(parse_labels(" , ,"), Vec::<String>::new());
    }

    #[test]
    fn test_generate_all_is_idempotent() {
        let mut m = matrix("S,M", "Negro,Blanco");
        m.generate_all();
        assert_eq!(m.variants().len(), 4);
        assert!(m.variants().iter().all(|v| v.stock == 0));

        let before = m.clone();
        m.generate_all();
        assert_eq!(m, before);
    }

    #[test]
    fn test_generate_preserves_existing_cells() {
        let mut m = matrix("S,M", "Negro");
        m.toggle_cell("S", "Negro");
        m.set_stock("S", "Negro", "9");
        m.generate_all();
        assert_eq!(m.variants().len(), 2);
        assert_eq!(m.get("S", "Negro").unwrap().stock, 9);
        assert_eq!(m.get("M", "Negro").unwrap().stock, 0);
    }

    #[test]
    fn test_toggle_cell_round_trip() {
        let mut m = matrix("S", "Negro");
        m.toggle_cell("S", "Negro");
        assert!(m.get("S", "Negro").is_some());
        m.toggle_cell("S", "Negro");
        assert!(m.get("S", "Negro").is_none());
    }

    #[test]
    fn test_toggle_outside_declared_sets_is_noop() {
        let mut m = matrix("S", "Negro");
        m.toggle_cell("XL", "Negro");
        m.toggle_cell("S", "Verde");
        assert!(m.variants().is_empty());
    }

    #[test]
    fn test_set_stock_coercion() {
        let mut m = matrix("S", "Negro");
        m.toggle_cell("S", "Negro");

        m.set_stock("S", "Negro", " 12 ");
        assert_eq!(m.get("S", "Negro").unwrap().stock, 12);

        m.set_stock("S", "Negro", "not-a-number");
        assert_eq!(m.get("S", "Negro").unwrap().stock, 0);

        m.set_stock("S", "Negro", "-4");
        assert_eq!(m.get("S", "Negro").unwrap().stock, 0);
    }

    #[test]
    fn test_set_stock_without_variant_is_noop() {
        let mut m = matrix("S", "Negro");
        m.set_stock("S", "Negro", "5");
        assert!(m.variants().is_empty());
    }

    #[test]
    fn test_set_sku() {
        let mut m = matrix("S", "Negro");
        m.toggle_cell("S", "Negro");
        m.set_sku("S", "Negro", " SH-S-NG ");
        assert_eq!(m.get("S", "Negro").unwrap().sku.as_deref(), Some("SH-S-NG"));
        m.set_sku("S", "Negro", "");
        assert_eq!(m.get("S", "Negro").unwrap().sku, None);
    }

    #[test]
    fn test_prune_on_option_set_change() {
        // Generate the full 2x2 grid, remove S/Negro, then shrink colors
        // to Blanco. Pruning only drops variants whose size or color left
        // the declared sets, so both Blanco cells survive.
        let mut m = matrix("S,M", "Negro,Blanco");
        m.generate_all();
        assert_eq!(m.variants().len(), 4);

        m.toggle_cell("S", "Negro");
        assert_eq!(m.variants().len(), 3);

        m.set_colors("Blanco");
        assert_eq!(
            pairs(&m),
            vec![
                ("S".to_owned(), "Blanco".to_owned()),
                ("M".to_owned(), "Blanco".to_owned()),
            ]
        );
    }

    #[test]
    fn test_prune_removes_exactly_orphans() {
        let mut m = matrix("S,M,L", "Negro,Blanco");
        m.generate_all();
        m.set_stock("M", "Blanco", "3");
        m.set_sizes("S,M");
        // L variants dropped, everything else untouched.
        assert_eq!(m.variants().len(), 4);
        assert!(pairs(&m).iter().all(|(s, _)| s != "L"));
        assert_eq!(m.get("M", "Blanco").unwrap().stock, 3);
    }

    #[test]
    fn test_new_dedups_untrusted_input() {
        let m = VariantMatrix::new(
            vec!["S".to_owned(), "S".to_owned(), "M".to_owned()],
            vec!["Negro".to_owned()],
            vec![
                Variant {
                    size: "S".to_owned(),
                    color: "Negro".to_owned(),
                    stock: 2,
                    sku: None,
                },
                // Duplicate pair: first record wins.
                Variant {
                    size: "S".to_owned(),
                    color: "Negro".to_owned(),
                    stock: 9,
                    sku: None,
                },
                // Orphan: color not declared.
                Variant {
                    size: "M".to_owned(),
                    color: "Verde".to_owned(),
                    stock: 1,
                    sku: None,
                },
            ],
        );
        assert_eq!(m.sizes(), ["S", "M"]);
        assert_eq!(m.variants().len(), 1);
        assert_eq!(m.get("S", "Negro").unwrap().stock, 2);
    }
}
