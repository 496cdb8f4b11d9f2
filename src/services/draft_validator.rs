//! Pure checks run on a proposed draft before anything is written.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::dtos::line::ProductInput;
use crate::error::AppError;
use crate::models::line::{ProductLine, ProductWithBreakups, SizeBreakupLine};

/// Fails with the names of every field that is absent or blank.
pub fn require_fields(fields: &[(&str, &Option<String>)]) -> Result<(), AppError> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| value.as_deref().is_none_or(|v| v.trim().is_empty()))
        .map(|(name, _)| *name)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(AppError::validation(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )))
    }
}

/// Fails when a field is present in an update but blank.
pub fn reject_blank(fields: &[(&str, &Option<String>)]) -> Result<(), AppError> {
    match fields
        .iter()
        .find(|(_, value)| value.as_deref().is_some_and(|v| v.trim().is_empty()))
    {
        Some((name, _)) => Err(AppError::validation(format!("{name} cannot be empty"))),
        None => Ok(()),
    }
}

/// Converts incoming products into validated lines.
///
/// Every product must carry a size-breakup collection; an empty one is accepted.
pub fn to_product_lines(products: &[ProductInput]) -> Result<Vec<ProductWithBreakups>, AppError> {
    if products.is_empty() {
        return Err(AppError::validation("At least one product is required"));
    }

    products
        .iter()
        .enumerate()
        .map(|(index, p)| {
            let name = p.product_name.trim();
            if name.is_empty() {
                return Err(AppError::validation(format!(
                    "Product #{} is missing a product name",
                    index + 1
                )));
            }

            let breakups = p.size_breakups.as_ref().ok_or_else(|| {
                AppError::structural(format!("Product \"{name}\" has no size breakups"))
            })?;

            let size_breakups = breakups
                .iter()
                .map(|b| {
                    if b.breakup < Decimal::ZERO || b.price < Decimal::ZERO {
                        return Err(AppError::validation(format!(
                            "Breakup and price must not be negative (product \"{name}\", size \"{}\")",
                            b.size
                        )));
                    }
                    Ok(SizeBreakupLine {
                        size: b.size.trim().to_string(),
                        breakup: b.breakup,
                        price: b.price,
                        condition: b.condition.clone(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;

            Ok(ProductWithBreakups {
                line: ProductLine {
                    product_id: p.product_id,
                    product_name: name.to_string(),
                    species: p.species.trim().to_string(),
                    packing: p.packing.clone(),
                    size_details: p.size_details.clone(),
                    breakup_details: p.breakup_details.clone(),
                    price_details: p.price_details.clone(),
                    condition_details: p.condition_details.clone(),
                },
                size_breakups,
            })
        })
        .collect()
}

/// Sum of raw breakup quantities across every product. Prices do not take part.
pub fn breakup_sum(products: &[ProductWithBreakups]) -> Result<Decimal, AppError> {
    products
        .iter()
        .flat_map(|p| p.size_breakups.iter())
        .try_fold(Decimal::ZERO, |acc, b| acc.checked_add(b.breakup))
        .ok_or_else(|| AppError::validation("Sum of size breakups overflows the supported range"))
}

pub fn check_breakup_total(products: &[ProductWithBreakups], grand_total: Decimal) -> Result<(), AppError> {
    let sum = breakup_sum(products)?;
    if sum == grand_total {
        Ok(())
    } else {
        Err(AppError::validation(format!(
            "Sum of size breakups ({}) does not match grand total ({})",
            sum.normalize(),
            grand_total.normalize()
        )))
    }
}

/// Validity may not be in the past when it is being set; shipment may not precede validity.
pub fn check_date_order(
    validity: Option<NaiveDate>,
    shipment: Option<NaiveDate>,
    validity_is_new: bool,
    today: NaiveDate,
) -> Result<(), AppError> {
    if let Some(v) = validity {
        if validity_is_new && v < today {
            return Err(AppError::validation(format!(
                "Offer validity date {v} cannot be in the past"
            )));
        }
    }

    if let (Some(v), Some(s)) = (validity, shipment) {
        if s < v {
            return Err(AppError::validation(format!(
                "Shipment date {s} cannot be before offer validity date {v}"
            )));
        }
    }

    Ok(())
}
