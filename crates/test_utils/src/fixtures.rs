//! Pre-built Test Fixtures
//!
//! Provides ready-to-use test data for common entities. These fixtures are
//! consistent and predictable for unit tests.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use domain_document::{ClientInfo, Company, DocType, PaymentPlanConfig, PricingTemplate};

/// Fixture for dates
pub struct DateFixtures;

impl DateFixtures {
    /// The reference issue date used across tests (2024-03-05, day 65)
    pub fn issue_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
    }

    /// First day of 2024
    pub fn new_year() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }
}

/// Fixture for company profiles
pub struct CompanyFixtures;

impl CompanyFixtures {
    /// A company with default prefixes and zeroed counters
    pub fn acme() -> Company {
        let mut company = Company::new("Acme Builders")
            .with_prefix(DocType::Quote, "COT-")
            .with_prefix(DocType::Invoice, "FAC-");
        company.address = "Av. Reforma 100, CDMX".to_string();
        company.phone = "+52 55 1234 5678".to_string();
        company.email = "hello@acme.example".to_string();
        company.pricing_templates = vec![PricingTemplate {
            name: "Painter (day)".to_string(),
            kind: "labor".to_string(),
            unit: "day".to_string(),
            unit_price: dec!(950),
        }];
        company
    }
}

/// Fixture for clients
pub struct ClientFixtures;

impl ClientFixtures {
    pub fn jordan() -> ClientInfo {
        let mut client = ClientInfo::new("Jordan Rivera");
        client.company = "Rivera Homes".to_string();
        client.email = "jordan@rivera.example".to_string();
        client
    }
}

/// Fixture for payment plans
pub struct PaymentPlanFixtures;

impl PaymentPlanFixtures {
    /// An enabled, interest-free plan
    pub fn interest_free(down_payment: Decimal, terms: &[u32]) -> PaymentPlanConfig {
        let mut config = PaymentPlanConfig::default();
        config.enabled = true;
        config.down_payment = down_payment;
        config.set_terms(terms.iter().copied());
        config
    }

    /// An enabled plan with base, risk and per-term increments
    pub fn with_interest(base: Decimal, risk: Decimal, increment: Decimal, terms: &[u32]) -> PaymentPlanConfig {
        let mut config = Self::interest_free(Decimal::ZERO, terms);
        config.base_interest_rate = base;
        config.risk_factor = risk;
        config.term_increment_rate = increment;
        config
    }
}

/// Fixture for image uploads
pub struct ImageFixtures;

impl ImageFixtures {
    /// A small solid-color PNG, encoded on the fly
    pub fn png(width: u32, height: u32) -> Vec<u8> {
        let image = image::RgbImage::from_pixel(width, height, image::Rgb([200, 30, 30]));
        let mut bytes = Vec::new();
        image
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    /// PNG wrapped as a `data:` URL
    pub fn png_data_url(width: u32, height: u32) -> String {
        domain_document::to_data_url("image/png", &Self::png(width, height))
    }

    /// Bytes that no decoder accepts
    pub fn garbage() -> Vec<u8> {
        b"definitely not an image".to_vec()
    }
}
