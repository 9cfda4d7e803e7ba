//! Pricing engine, markup action and payment plan tests
//!
//! # Test Organization
//!
//! - `totals` - worked examples of document totals
//! - `attribution` - per-item markup and VAT attribution
//! - `aggregate_markup` - the "apply markup as line item" action
//! - `payment_plan` - the payment plan calculator
//! - `reconciliation` - property tests for the sum invariants

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use domain_document::item::DESCRIPTION;
use domain_document::{ColumnRegistry, MarkupDistribution, MAX_PAYMENT_TERM};
use domain_pricing::{
    apply_markup_as_line_item, calculate_payment_plan, derived_value, document_totals,
    financed_balance, item_figures, DocumentPricing, PricingError,
};
use test_utils::{
    assert_decimal_approx_eq, assert_sums_to, PaymentPlanFixtures, TestCategoryBuilder,
    TestDocumentBuilder, CENT_FRACTION,
};

mod totals {
    use super::*;

    #[test]
    fn test_two_categories_mixed_vat() {
        let document = TestDocumentBuilder::new()
            .with_category(
                TestCategoryBuilder::new("Labor")
                    .with_percentage_markup(dec!(20))
                    .with_items(&[(dec!(10), dec!(100))])
                    .build(),
            )
            .with_category(
                TestCategoryBuilder::new("Materials")
                    .without_vat()
                    .with_items(&[(dec!(3), dec!(50)), (dec!(1), dec!(25))])
                    .build(),
            )
            .build();

        let totals = document_totals(&document);
        assert_eq!(totals.subtotal, dec!(1375));
        assert_eq!(totals.tax, dec!(192));
        assert_eq!(totals.total, dec!(1567));
    }

    #[test]
    fn test_vat_hidden_document_has_no_tax() {
        let document = TestDocumentBuilder::new()
            .with_vat(false, dec!(16))
            .with_category(
                TestCategoryBuilder::new("Labor")
                    .with_items(&[(dec!(1), dec!(100))])
                    .build(),
            )
            .build();
        let totals = document_totals(&document);
        assert_eq!(totals.tax, Decimal::ZERO);
        assert_eq!(totals.total, dec!(100));
    }

    #[test]
    fn test_non_numeric_values_count_as_zero() {
        let mut category = TestCategoryBuilder::new("Labor")
            .with_items(&[(dec!(2), dec!(10))])
            .build();
        let item = &mut category.subcategories[0].items[0];
        item.set("quantity", "lots".into()).unwrap();

        let document = TestDocumentBuilder::new().with_category(category).build();
        assert_eq!(document_totals(&document).subtotal, Decimal::ZERO);
    }

    #[test]
    fn test_pricing_is_repeatable() {
        let document = TestDocumentBuilder::new()
            .with_category(
                TestCategoryBuilder::new("Labor")
                    .with_fixed_markup(dec!(33))
                    .with_items(&[(dec!(1), dec!(10)), (dec!(2), dec!(7))])
                    .build(),
            )
            .build();
        assert_eq!(DocumentPricing::compute(&document), DocumentPricing::compute(&document));
    }
}

mod attribution {
    use super::*;

    #[test]
    fn test_distribution_modes_attribute_identically() {
        let build = |distribution| {
            TestDocumentBuilder::new()
                .with_category(
                    TestCategoryBuilder::new("Labor")
                        .with_percentage_markup(dec!(15))
                        .with_distribution(distribution)
                        .with_items(&[(dec!(1), dec!(100)), (dec!(4), dec!(30))])
                        .build(),
                )
                .build()
        };
        let proportional = DocumentPricing::compute(&build(MarkupDistribution::Proportional));
        let per_item = DocumentPricing::compute(&build(MarkupDistribution::PerItem));

        assert_eq!(proportional.totals, per_item.totals);
        let markups = |p: &DocumentPricing| {
            p.categories[0]
                .items
                .iter()
                .map(|i| i.figures.markup)
                .collect::<Vec<_>>()
        };
        assert_eq!(markups(&proportional), markups(&per_item));
        assert_eq!(markups(&proportional), vec![dec!(15), dec!(18)]);
    }

    #[test]
    fn test_item_vat_includes_markup() {
        let document = TestDocumentBuilder::new()
            .with_category(
                TestCategoryBuilder::new("Labor")
                    .with_fixed_markup(dec!(50))
                    .with_items(&[(dec!(1), dec!(100)), (dec!(1), dec!(100))])
                    .build(),
            )
            .build();
        let category = &document.categories[0];
        let first = category.items().next().unwrap();
        let figures = item_figures(&document, category, first);
        assert_eq!(figures.markup, dec!(25));
        assert_eq!(figures.vat, dec!(20));
        assert_eq!(figures.total(), dec!(100));
    }

    #[test]
    fn test_item_total_column_excludes_markup_and_vat() {
        let document = TestDocumentBuilder::new()
            .with_category(
                TestCategoryBuilder::new("Labor")
                    .with_percentage_markup(dec!(100))
                    .with_items(&[(dec!(3), dec!(5))])
                    .build(),
            )
            .build();
        let category = &document.categories[0];
        let item = category.items().next().unwrap();
        assert_eq!(derived_value(&document, category, item, "total"), Some(dec!(15)));
    }
}

mod aggregate_markup {
    use super::*;

    fn two_category_document() -> domain_document::DocumentState {
        TestDocumentBuilder::new()
            .with_category(
                TestCategoryBuilder::new("Labor")
                    .with_items(&[(dec!(1), dec!(400))])
                    .build(),
            )
            .with_category(
                TestCategoryBuilder::new("Management")
                    .with_items(&[(dec!(1), dec!(100))])
                    .build(),
            )
            .build()
    }

    #[test]
    fn test_base_is_other_categories_subtotal() {
        let mut document = two_category_document();
        let registry = ColumnRegistry::seeded();
        let target = document.categories[1].id;

        let item_id = apply_markup_as_line_item(&mut document, target, &registry).unwrap();
        let category = document.category(target).unwrap();
        let item = category.find_item(item_id).unwrap();

        assert_eq!(item.unit_price(), dec!(400));
        assert_eq!(item.quantity(), Decimal::ONE);
        assert_eq!(item.text(DESCRIPTION), "Aggregate markup #1");
        assert_eq!(category.markup_applications, 1);
        assert_eq!(category.subcategories[0].items.last().map(|i| i.id), Some(item_id));
    }

    #[test]
    fn test_labels_increment() {
        let mut document = two_category_document();
        let registry = ColumnRegistry::seeded();
        let target = document.categories[1].id;

        apply_markup_as_line_item(&mut document, target, &registry).unwrap();
        let second = apply_markup_as_line_item(&mut document, target, &registry).unwrap();
        let category = document.category(target).unwrap();
        assert_eq!(category.find_item(second).unwrap().text(DESCRIPTION), "Aggregate markup #2");
    }

    #[test]
    fn test_single_category_falls_back_to_document_subtotal() {
        let mut document = TestDocumentBuilder::new()
            .with_category(
                TestCategoryBuilder::new("Labor")
                    .with_items(&[(dec!(2), dec!(60))])
                    .build(),
            )
            .build();
        let registry = ColumnRegistry::seeded();
        let target = document.categories[0].id;

        let item_id = apply_markup_as_line_item(&mut document, target, &registry).unwrap();
        let item = document.category(target).unwrap().find_item(item_id).unwrap();
        assert_eq!(item.unit_price(), dec!(120));
    }

    #[test]
    fn test_unknown_category() {
        let mut document = two_category_document();
        let before = document.clone();
        let result = apply_markup_as_line_item(
            &mut document,
            core_kernel::CategoryId::new(),
            &ColumnRegistry::seeded(),
        );
        assert!(matches!(result, Err(PricingError::CategoryNotFound(_))));
        assert_eq!(document, before);
    }
}

mod payment_plan {
    use super::*;

    #[test]
    fn test_interest_free_example() {
        let plan = PaymentPlanFixtures::interest_free(dec!(1000), &[12]);
        let options = calculate_payment_plan(dec!(11000), &plan);
        assert_eq!(options.len(), 1);
        assert_decimal_approx_eq(options[0].monthly_payment, dec!(833.33), dec!(0.01));
        assert_eq!(options[0].total_payment, dec!(10000));
    }

    #[test]
    fn test_disabled_or_empty_plans() {
        let mut plan = PaymentPlanFixtures::interest_free(Decimal::ZERO, &[6, 12]);
        plan.enabled = false;
        assert!(calculate_payment_plan(dec!(5000), &plan).is_empty());

        let plan = PaymentPlanFixtures::interest_free(Decimal::ZERO, &[]);
        assert!(calculate_payment_plan(dec!(5000), &plan).is_empty());
    }

    #[test]
    fn test_down_payment_covering_total() {
        let plan = PaymentPlanFixtures::interest_free(dec!(5000), &[6]);
        assert!(calculate_payment_plan(dec!(5000), &plan).is_empty());
    }

    #[test]
    fn test_amortized_payment() {
        // 12% annual -> 1% monthly; 10,000 over 12 months
        let plan = PaymentPlanFixtures::with_interest(dec!(12), Decimal::ZERO, Decimal::ZERO, &[12]);
        let options = calculate_payment_plan(dec!(10000), &plan);
        assert_decimal_approx_eq(options[0].monthly_payment, dec!(888.4879), dec!(0.0001));
        assert_eq!(options[0].annual_rate, dec!(12));
    }

    #[test]
    fn test_term_increment_composes_rate() {
        let plan = PaymentPlanFixtures::with_interest(dec!(10), dec!(2), dec!(6), &[6, 24]);
        let options = calculate_payment_plan(dec!(10000), &plan);
        assert_eq!(options[0].annual_rate, dec!(15));
        assert_eq!(options[1].annual_rate, dec!(24));
        assert!(options[1].total_payment > options[0].total_payment);
    }

    #[test]
    fn test_extreme_rates_are_skipped_not_fatal() {
        let plan = PaymentPlanFixtures::with_interest(Decimal::MAX, Decimal::MAX, Decimal::MAX, &[6, 12]);
        assert!(calculate_payment_plan(dec!(10000), &plan).is_empty());

        let plan = PaymentPlanFixtures::with_interest(dec!(12), Decimal::ZERO, Decimal::MAX, &[1, 12]);
        assert!(calculate_payment_plan(Decimal::MAX, &plan).is_empty());
    }

    #[test]
    fn test_negative_extreme_down_payment() {
        let plan = PaymentPlanFixtures::interest_free(Decimal::MIN, &[12]);
        assert_eq!(financed_balance(dec!(100), &plan), Decimal::ZERO);
        assert!(calculate_payment_plan(dec!(100), &plan).is_empty());
    }

    #[test]
    fn test_terms_beyond_the_cap_are_dropped() {
        let plan = PaymentPlanFixtures::interest_free(Decimal::ZERO, &[12, MAX_PAYMENT_TERM + 1, u32::MAX]);
        let options = calculate_payment_plan(dec!(1200), &plan);
        assert_eq!(options.iter().map(|o| o.term).collect::<Vec<_>>(), vec![12]);
    }

    #[test]
    fn test_longest_allowed_term_is_amortized() {
        let plan = PaymentPlanFixtures::with_interest(dec!(6), Decimal::ZERO, Decimal::ZERO, &[MAX_PAYMENT_TERM]);
        let options = calculate_payment_plan(dec!(100000), &plan);
        assert_eq!(options.len(), 1);
        // 0.5% monthly over 50 years
        assert_decimal_approx_eq(options[0].monthly_payment, dec!(526.40), dec!(0.01));
        assert!(options[0].total_payment > dec!(300000));
    }
}

mod reconciliation {
    use super::*;
    use domain_document::MarkupType;
    use proptest::prelude::*;
    use test_utils::{document_strategy, payment_plan_strategy};

    proptest! {
        #[test]
        fn category_subtotals_sum_to_document_subtotal(document in document_strategy()) {
            let pricing = DocumentPricing::compute(&document);
            let subtotals: Vec<Decimal> = pricing.categories.iter().map(|c| c.subtotal).collect();
            let vats: Vec<Decimal> = pricing.categories.iter().map(|c| c.vat).collect();
            assert_sums_to(&subtotals, pricing.totals.subtotal, Decimal::ZERO);
            assert_sums_to(&vats, pricing.totals.tax, Decimal::ZERO);
            prop_assert_eq!(pricing.totals.total, pricing.totals.subtotal + pricing.totals.tax);
        }

        #[test]
        fn category_subtotal_is_raw_plus_markup(document in document_strategy()) {
            let pricing = DocumentPricing::compute(&document);
            for category in &pricing.categories {
                prop_assert_eq!(category.subtotal, category.raw_subtotal + category.markup);
                let items: Vec<Decimal> = category.items.iter().map(|i| i.figures.subtotal).collect();
                assert_sums_to(&items, category.raw_subtotal, Decimal::ZERO);
            }
        }

        #[test]
        fn fixed_markup_attribution_reconciles(document in document_strategy()) {
            let pricing = DocumentPricing::compute(&document);
            for (category, priced) in document.categories.iter().zip(&pricing.categories) {
                if category.markup_type != MarkupType::Fixed {
                    continue;
                }
                let markups: Vec<Decimal> = priced.items.iter().map(|i| i.figures.markup).collect();
                if priced.raw_subtotal.is_zero() {
                    prop_assert!(markups.iter().all(|m| m.is_zero()));
                } else {
                    assert_sums_to(&markups, category.markup_value, CENT_FRACTION);
                }
            }
        }

        #[test]
        fn percentage_item_markup_reconciles(document in document_strategy()) {
            let pricing = DocumentPricing::compute(&document);
            for (category, priced) in document.categories.iter().zip(&pricing.categories) {
                if category.markup_type != MarkupType::Percentage {
                    continue;
                }
                let markups: Vec<Decimal> = priced.items.iter().map(|i| i.figures.markup).collect();
                assert_sums_to(&markups, priced.markup, CENT_FRACTION);
                let vats: Vec<Decimal> = priced.items.iter().map(|i| i.figures.vat).collect();
                assert_sums_to(&vats, priced.vat, CENT_FRACTION);
            }
        }

        #[test]
        fn payment_options_follow_term_order(
            plan in payment_plan_strategy(),
            total in (0i64..100_000_000i64).prop_map(|n| Decimal::new(n, 2)),
        ) {
            let options = calculate_payment_plan(total, &plan);
            let terms: Vec<u32> = options.iter().map(|o| o.term).collect();
            let mut sorted = terms.clone();
            sorted.sort_unstable();
            prop_assert_eq!(&terms, &sorted);
            prop_assert!(terms.iter().all(|&t| t > 0));
            for option in &options {
                prop_assert!(option.total_payment >= total - plan.down_payment - CENT_FRACTION);
            }
        }
    }
}
