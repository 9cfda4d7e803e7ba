//! Test Data Builders
//!
//! Provides builder patterns for constructing test documents with sensible
//! defaults. Tests specify only the relevant fields.

use fake::faker::company::en::CompanyName;
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use fake::Fake;
use rust_decimal::Decimal;

use core_kernel::Currency;
use domain_document::item::{DESCRIPTION, QUANTITY, UNIT_PRICE};
use domain_document::{
    ClientInfo, ColumnRegistry, Company, CostCategory, DocType, DocumentState, Item,
    MarkupDistribution, MarkupType, PaymentPlanConfig, Subcategory, ThirdPartyTicket,
};

use crate::fixtures::{CompanyFixtures, DateFixtures};

/// Builds an item from the seeded registry defaults
pub fn test_item(description: &str, quantity: Decimal, unit_price: Decimal) -> Item {
    ColumnRegistry::seeded()
        .new_item()
        .with(DESCRIPTION, description)
        .with(QUANTITY, quantity)
        .with(UNIT_PRICE, unit_price)
}

/// Builder for cost categories
pub struct TestCategoryBuilder {
    name: String,
    markup_type: MarkupType,
    markup_value: Decimal,
    distribution: MarkupDistribution,
    apply_vat: bool,
    subcategories: Vec<Subcategory>,
}

impl TestCategoryBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            markup_type: MarkupType::None,
            markup_value: Decimal::ZERO,
            distribution: MarkupDistribution::Proportional,
            apply_vat: true,
            subcategories: Vec::new(),
        }
    }

    pub fn with_percentage_markup(mut self, value: Decimal) -> Self {
        self.markup_type = MarkupType::Percentage;
        self.markup_value = value;
        self
    }

    pub fn with_fixed_markup(mut self, value: Decimal) -> Self {
        self.markup_type = MarkupType::Fixed;
        self.markup_value = value;
        self
    }

    pub fn with_distribution(mut self, distribution: MarkupDistribution) -> Self {
        self.distribution = distribution;
        self
    }

    pub fn without_vat(mut self) -> Self {
        self.apply_vat = false;
        self
    }

    /// Adds a subcategory holding the given items
    pub fn with_subcategory(mut self, name: &str, items: Vec<Item>) -> Self {
        let mut subcategory = Subcategory::new(name);
        subcategory.items = items;
        self.subcategories.push(subcategory);
        self
    }

    /// Adds `(quantity, unit_price)` items to a single "General" subcategory
    pub fn with_items(self, items: &[(Decimal, Decimal)]) -> Self {
        let items = items
            .iter()
            .enumerate()
            .map(|(i, (qty, price))| test_item(&format!("Item {}", i + 1), *qty, *price))
            .collect();
        self.with_subcategory("General", items)
    }

    pub fn build(self) -> CostCategory {
        let mut category = CostCategory::new(self.name, &ColumnRegistry::seeded())
            .with_markup(self.markup_type, self.markup_value)
            .with_vat(self.apply_vat)
            .with_subcategories(self.subcategories);
        category.markup_distribution = self.distribution;
        category
    }
}

/// Builder for documents
pub struct TestDocumentBuilder {
    company: Company,
    doc_type: DocType,
    categories: Vec<CostCategory>,
    show_vat: bool,
    vat_rate: Decimal,
    currency: Option<Currency>,
    client: Option<ClientInfo>,
    payment_plan: Option<PaymentPlanConfig>,
    tickets: Vec<ThirdPartyTicket>,
    terms: String,
}

impl Default for TestDocumentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestDocumentBuilder {
    pub fn new() -> Self {
        Self {
            company: CompanyFixtures::acme(),
            doc_type: DocType::Quote,
            categories: Vec::new(),
            show_vat: true,
            vat_rate: Decimal::from(16),
            currency: None,
            client: None,
            payment_plan: None,
            tickets: Vec::new(),
            terms: String::new(),
        }
    }

    pub fn with_company(mut self, company: Company) -> Self {
        self.company = company;
        self
    }

    pub fn with_doc_type(mut self, doc_type: DocType) -> Self {
        self.doc_type = doc_type;
        self
    }

    pub fn with_category(mut self, category: CostCategory) -> Self {
        self.categories.push(category);
        self
    }

    pub fn with_vat(mut self, show_vat: bool, rate: Decimal) -> Self {
        self.show_vat = show_vat;
        self.vat_rate = rate;
        self
    }

    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = Some(currency);
        self
    }

    pub fn with_client(mut self, client: ClientInfo) -> Self {
        self.client = Some(client);
        self
    }

    /// Uses a randomly generated client
    pub fn with_fake_client(mut self) -> Self {
        let mut client = ClientInfo::new(Name().fake::<String>());
        client.company = CompanyName().fake();
        client.email = SafeEmail().fake();
        self.client = Some(client);
        self
    }

    pub fn with_payment_plan(mut self, plan: PaymentPlanConfig) -> Self {
        self.payment_plan = Some(plan);
        self
    }

    pub fn with_ticket(mut self, ticket: ThirdPartyTicket) -> Self {
        self.tickets.push(ticket);
        self
    }

    pub fn with_terms(mut self, terms: impl Into<String>) -> Self {
        self.terms = terms.into();
        self
    }

    /// Builds the document; without explicit categories it keeps the
    /// template's single empty "General" category
    pub fn build(self) -> DocumentState {
        let registry = ColumnRegistry::seeded();
        let mut document = DocumentState::from_template(
            &self.company,
            self.doc_type,
            &registry,
            DateFixtures::issue_date(),
        );
        if !self.categories.is_empty() {
            document.categories = self.categories;
        }
        document.show_vat = self.show_vat;
        document.vat_rate = self.vat_rate;
        if let Some(currency) = self.currency {
            document.currency = currency;
        }
        if let Some(client) = self.client {
            document.client = client;
        }
        document.payment_plan = self.payment_plan;
        document.third_party_tickets = self.tickets;
        document.terms = self.terms;
        document
    }
}
