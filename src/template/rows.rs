use crate::config::TemplateConfig;
use crate::error::{Result, VamaError};
use crate::parser::{parse_amount, parse_count, ImportDeclaration, NumberError};
use crate::sink::{LogEntry, LogSink};
use crate::template::Variant;
use rust_decimal::{Decimal, RoundingStrategy};

pub type Row = Vec<String>;

pub const PRIMARY_PRODUCT: &str = "PRIMARY CUSTOMS DECLARATION";
pub const TRANSIT_PRODUCT: &str = "TRANSIT";
pub const ADDITIONAL_HS_CODE_PRODUCT: &str = "ADDITIONAL HS CODE";
pub const PHYSICAL_CONTROL_PRODUCT: &str = "PHYSICAL CONTROL";
pub const COMMISSION_PRODUCT: &str = "ADVANCE PAYMENT COMMISSION";
pub const ADVANCE_PAYMENT_PRODUCT: &str = "ADVANCE PAYMENT";

/// Expands declarations into accounting rows for one variant.
pub struct RowTemplater<'a> {
    config: &'a TemplateConfig,
    variant: Variant,
}

impl<'a> RowTemplater<'a> {
    pub fn new(config: &'a TemplateConfig, variant: Variant) -> Self {
        Self { config, variant }
    }

    pub fn header(&self) -> Vec<&'static str> {
        self.variant.header()
    }

    /// Renders every declaration in order. Any failure aborts the whole batch.
    pub fn render(&self, declarations: &[ImportDeclaration], sink: &dyn LogSink) -> Result<Vec<Row>> {
        let commission_rate = self.commission_rate()?;
        let mut rows = Vec::with_capacity(declarations.len() * 3);

        for (index, declaration) in declarations.iter().enumerate() {
            let counter = index + 1;
            rows.extend(self.render_declaration(counter, declaration, commission_rate, sink)?);
        }

        Ok(rows)
    }

    fn render_declaration(
        &self,
        counter: usize,
        declaration: &ImportDeclaration,
        commission_rate: Decimal,
        sink: &dyn LogSink,
    ) -> Result<Vec<Row>> {
        let prices = &self.config.prices;
        let mrn_note = format!(
            "MRN {} - CONTAINER{}",
            declaration.movement_reference_number, declaration.container_number
        );
        let (primary_price, primary_vat) = self.primary_pricing(&declaration.consignee_id);

        let mut rows = vec![
            self.row(
                counter,
                &declaration.consignee_id,
                PRIMARY_PRODUCT,
                "1",
                primary_price,
                primary_vat,
                &mrn_note,
            ),
            self.row(
                counter,
                "",
                TRANSIT_PRODUCT,
                "1",
                &prices.transit,
                &self.config.default_vat_rate,
                &declaration.document_reference,
            ),
        ];

        let articles = match parse_count(&declaration.article_count) {
            Ok(count) => count,
            Err(NumberError::Empty) => 0,
            Err(e) => {
                sink.append(LogEntry::warning(format!(
                    "Declaration {} (MRN {}): article count {}, treated as 0",
                    counter, declaration.movement_reference_number, e
                )));
                0
            }
        };
        if articles > 1 {
            rows.push(self.row(
                counter,
                "",
                ADDITIONAL_HS_CODE_PRODUCT,
                &(articles - 1).to_string(),
                &prices.additional_hs_code,
                &self.config.default_vat_rate,
                &mrn_note,
            ));
        }

        if self.variant.includes_physical_control() {
            let note = format!(
                "{} - {}",
                self.location_tag(&declaration.document_reference),
                declaration.document_reference
            );
            rows.push(self.row(
                counter,
                "",
                PHYSICAL_CONTROL_PRODUCT,
                "0",
                &prices.physical_control,
                &self.config.default_vat_rate,
                &note,
            ));
        }

        if declaration.has_advance_deposit() {
            let total = declaration.advance_payment_total_or_zero();
            let commission = commission_for(total, commission_rate).ok_or_else(|| {
                VamaError::Template {
                    record: format!("declaration {}", counter),
                    message: format!("commission on {} overflows", total),
                }
            })?;
            let note = format!("MRN {}", declaration.movement_reference_number);

            rows.push(self.row(
                counter,
                "",
                COMMISSION_PRODUCT,
                "1",
                &commission.to_string(),
                &self.config.default_vat_rate,
                &note,
            ));
            rows.push(self.row(
                counter,
                "",
                ADVANCE_PAYMENT_PRODUCT,
                "1",
                &total.normalize().to_string(),
                &self.config.default_vat_rate,
                &note,
            ));
        }

        Ok(rows)
    }

    #[allow(clippy::too_many_arguments)]
    fn row(
        &self,
        counter: usize,
        tax_id: &str,
        product: &str,
        quantity: &str,
        price: &str,
        vat_rate: &str,
        note: &str,
    ) -> Row {
        self.variant.layout(vec![
            counter.to_string(),
            tax_id.to_string(),
            self.config.currency.clone(),
            product.to_string(),
            self.config.series_label.clone(),
            quantity.to_string(),
            self.config.unit.clone(),
            price.to_string(),
            vat_rate.to_string(),
            note.to_string(),
            String::new(),
            String::new(),
        ])
    }

    /// Price and VAT rate for the primary row; some consignees are billed
    /// differently, matched on the exact tax id.
    fn primary_pricing(&self, tax_id: &str) -> (&str, &str) {
        self.config
            .consignee_overrides
            .iter()
            .find(|o| o.tax_id == tax_id)
            .map(|o| (o.primary_price.as_str(), o.vat_rate.as_str()))
            .unwrap_or((
                self.config.prices.primary.as_str(),
                self.config.default_vat_rate.as_str(),
            ))
    }

    /// Short customs-office tag for a document reference.
    pub fn location_tag(&self, reference: &str) -> &str {
        self.config
            .location_rewrites
            .iter()
            .find(|r| reference.contains(&r.prefix))
            .map(|r| r.tag.as_str())
            .unwrap_or(self.config.default_location_tag.as_str())
    }

    fn commission_rate(&self) -> Result<Decimal> {
        parse_amount(&self.config.commission_rate).map_err(|e| VamaError::Config {
            message: format!("template.commission_rate: {}", e),
        })
    }
}

/// `total × rate`, rounded half away from zero to two decimals.
///
/// Same as half-up for the positive totals declarations carry; the two only
/// differ for negative totals.
pub fn commission_for(total: Decimal, rate: Decimal) -> Option<Decimal> {
    total
        .checked_mul(rate)
        .map(|c| c.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero).normalize())
}
