use crate::{
    error::{IpcError, Result},
    helper,
    request::IpcRequest,
};

/// Kind of cart line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ItemType {
    #[default]
    Article,
    /// Shipping line, flagged with `Delivery_i = 1`
    Delivery,
    /// Price is stored negated
    Discount,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CartItem {
    pub name: String,
    pub quantity: u32,
    pub price: f64,
    pub delivery: bool,
    price_cents: i64,
}

impl CartItem {
    /// Line total.
    pub fn amount(&self) -> f64 {
        self.amount_cents() as f64 / 100.0
    }

    fn amount_cents(&self) -> i64 {
        self.price_cents * i64::from(self.quantity)
    }
}

/// Purchase cart.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a line.
    ///
    /// # Arguments
    ///
    /// * `name` - item name shown on the payment page
    /// * `quantity` - must be at least one
    /// * `price` - single item price with at most two decimals, positive even for discounts
    /// * `kind` - line kind
    pub fn add(
        &mut self,
        name: impl Into<String>,
        quantity: u32,
        price: f64,
        kind: ItemType,
    ) -> Result<&mut Self> {
        let name = name.into();
        if !helper::is_present(&name) {
            return Err(IpcError::validation("Invalid cart item name"));
        }
        if quantity == 0 {
            return Err(IpcError::validation("Invalid cart item quantity"));
        }
        let cents = helper::to_cents(price)
            .filter(|_| helper::is_valid_amount(price))
            .ok_or_else(|| IpcError::validation("Invalid cart item price"))?;

        let (price, price_cents) = match kind {
            ItemType::Discount => (-price, -cents),
            _ => (price, cents),
        };

        self.items.push(CartItem {
            name,
            quantity,
            price,
            delivery: kind == ItemType::Delivery,
            price_cents,
        });

        Ok(self)
    }

    /// Sum of all line totals.
    pub fn total(&self) -> f64 {
        self.total_cents() as f64 / 100.0
    }

    /// Sum of the line totals in cents, so it always matches the sent `Amount_i` fields.
    pub(crate) fn total_cents(&self) -> i64 {
        self.items.iter().map(CartItem::amount_cents).sum()
    }

    pub fn items_count(&self) -> usize {
        self.items.len()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn validate(&self) -> Result<()> {
        if self.items.is_empty() {
            return Err(IpcError::validation("Missing cart items"));
        }
        Ok(())
    }

    /// Appends `CartItems` and the numbered item fields.
    ///
    /// `Delivery_i` is only written for delivery lines, and only when
    /// `with_delivery` is set.
    pub(crate) fn add_to(&self, req: &mut IpcRequest<'_>, currency: &str, with_delivery: bool) {
        req.add_param("CartItems", self.items_count());

        for (i, item) in self.items.iter().enumerate() {
            let n = i + 1;
            req.add_param(format!("Article_{n}"), &item.name)
                .add_param(format!("Quantity_{n}"), item.quantity)
                .add_param(format!("Price_{n}"), helper::format_cents(item.price_cents))
                .add_param(format!("Amount_{n}"), helper::format_cents(item.amount_cents()))
                .add_param(format!("Currency_{n}"), currency);

            if with_delivery && item.delivery {
                req.add_param(format!("Delivery_{n}"), 1);
            }
        }
    }
}
