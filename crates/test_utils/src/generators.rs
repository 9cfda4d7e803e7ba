//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating documents that keep the
//! model's invariants (at least one subcategory per category, no stored
//! derived keys).

use proptest::prelude::*;
use rust_decimal::Decimal;

use domain_document::{
    CostCategory, DocumentState, Item, MarkupDistribution, MarkupType, PaymentPlanConfig,
};

use crate::builders::{test_item, TestCategoryBuilder, TestDocumentBuilder};

/// Quantities from 0 to 999.99
pub fn quantity_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..100_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Unit prices from 0 to 99,999.99
pub fn price_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Percentages from 0% to 100% with two decimals
pub fn percentage_strategy() -> impl Strategy<Value = Decimal> {
    (0u32..10_000u32).prop_map(|n| Decimal::new(n as i64, 2))
}

pub fn markup_type_strategy() -> impl Strategy<Value = MarkupType> {
    prop_oneof![
        Just(MarkupType::None),
        Just(MarkupType::Percentage),
        Just(MarkupType::Fixed),
    ]
}

pub fn distribution_strategy() -> impl Strategy<Value = MarkupDistribution> {
    prop_oneof![
        Just(MarkupDistribution::Proportional),
        Just(MarkupDistribution::PerItem),
    ]
}

pub fn item_strategy() -> impl Strategy<Value = Item> {
    (quantity_strategy(), price_strategy()).prop_map(|(qty, price)| test_item("Generated", qty, price))
}

/// Items spread over one to three subcategories
pub fn subcategory_items_strategy() -> impl Strategy<Value = Vec<Vec<Item>>> {
    prop::collection::vec(prop::collection::vec(item_strategy(), 0..6), 1..4)
}

pub fn category_strategy() -> impl Strategy<Value = CostCategory> {
    (
        markup_type_strategy(),
        percentage_strategy(),
        distribution_strategy(),
        any::<bool>(),
        subcategory_items_strategy(),
    )
        .prop_map(|(markup_type, value, distribution, apply_vat, subcategories)| {
            let mut builder = TestCategoryBuilder::new("Generated").with_distribution(distribution);
            builder = match markup_type {
                MarkupType::None => builder,
                MarkupType::Percentage => builder.with_percentage_markup(value),
                MarkupType::Fixed => builder.with_fixed_markup(value * Decimal::from(10)),
            };
            if !apply_vat {
                builder = builder.without_vat();
            }
            for (i, items) in subcategories.into_iter().enumerate() {
                builder = builder.with_subcategory(&format!("Sub {}", i + 1), items);
            }
            builder.build()
        })
}

pub fn document_strategy() -> impl Strategy<Value = DocumentState> {
    (
        prop::collection::vec(category_strategy(), 1..5),
        any::<bool>(),
        percentage_strategy(),
    )
        .prop_map(|(categories, show_vat, vat_rate)| {
            categories
                .into_iter()
                .fold(TestDocumentBuilder::new(), |b, c| b.with_category(c))
                .with_vat(show_vat, vat_rate)
                .build()
        })
}

/// Enabled plans with term lengths up to five years
pub fn payment_plan_strategy() -> impl Strategy<Value = PaymentPlanConfig> {
    (
        prop::collection::vec(0u32..61, 0..6),
        percentage_strategy(),
        percentage_strategy(),
        (0u32..500u32).prop_map(|n| Decimal::new(n as i64, 2)),
        (0i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2)),
    )
        .prop_map(|(terms, base, risk, increment, down_payment)| {
            let mut config = PaymentPlanConfig::default();
            config.enabled = true;
            config.set_terms(terms);
            config.base_interest_rate = base;
            config.risk_factor = risk;
            config.term_increment_rate = increment;
            config.down_payment = down_payment;
            config
        })
}
