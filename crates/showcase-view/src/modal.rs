//! Single-product detail modal.

use showcase_core::Product;

/// `{selected_product, is_open}` for the detail dialog.
///
/// Closing clears the selection so reopening never shows stale data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailModal {
    selected_product: Option<Product>,
    is_open: bool,
}

impl DetailModal {
    pub fn show(&mut self, product: Product) {
        self.selected_product = Some(product);
        self.is_open = true;
    }

    pub fn close(&mut self) {
        self.is_open = false;
        self.selected_product = None;
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn selected_product(&self) -> Option<&Product> {
        self.selected_product.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use showcase_core::ProductId;

    #[test]
    fn test_close_clears_selection() {
        let mut modal = DetailModal::default();
        modal.show(Product {
            id: ProductId::new(3),
            ..Default::default()
        });
        assert!(modal.is_open());
        assert_eq!(modal.selected_product().map(|p| p.id), Some(ProductId::new(3)));

        modal.close();
        assert!(!modal.is_open());
        assert!(modal.selected_product().is_none());
    }

    #[test]
    fn test_show_replaces_selection() {
        let mut modal = DetailModal::default();
        modal.show(Product {
            id: ProductId::new(1),
            ..Default::default()
        });
        modal.show(Product {
            id: ProductId::new(2),
            ..Default::default()
        });
        assert_eq!(modal.selected_product().map(|p| p.id), Some(ProductId::new(2)));
    }
}
