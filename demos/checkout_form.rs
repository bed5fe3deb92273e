use std::{convert::Infallible, fmt::Write};

use paykun_checkout::{
    builder::OrderBuilder,
    form::{FormPayload, FormRenderer},
    types::{Address, CustomerInfo, Environment, MerchantCredentials, OrderDetails},
};

/// Renders a bare auto-submitting form without a template engine.
struct AutoSubmitForm;

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

impl FormRenderer for AutoSubmitForm {
    type Error = Infallible;

    fn render(&self, _template: &str, payload: &FormPayload) -> Result<String, Self::Error> {
        let mut inputs = String::new();
        for (name, value) in payload.fields() {
            let _ = writeln!(
                inputs,
                r#"    <input type="hidden" name="{name}" value="{}">"#,
                escape(value)
            );
        }

        Ok(format!(
            r#"<!DOCTYPE html>
<html>
<head><title>{title}</title></head>
<body onload="document.forms[0].submit()">
  <form method="POST" action="{action}">
{inputs}  </form>
</body>
</html>"#,
            title = escape(&payload.page_title),
            action = escape(&payload.gateway_url),
        ))
    }
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .init();

    let credentials = MerchantCredentials::builder()
        .merchant_id(std::env::var("PAYKUN_MERCHANT_ID").unwrap_or_else(|_| "M1".into()))
        .access_token(std::env::var("PAYKUN_ACCESS_TOKEN").unwrap_or_else(|_| "TOK1".into()))
        .encryption_key(std::env::var("PAYKUN_ENCRYPTION_KEY").unwrap_or_else(|_| "KEY1".into()))
        .environment(
            std::env::var("PAYKUN_ENVIRONMENT")
                .ok()
                .map(|env| env.parse::<Environment>())
                .transpose()?
                .unwrap_or(Environment::Sandbox),
        )
        .build();

    let address = Address::builder()
        .country("IN")
        .state("MH")
        .city("Pune")
        .postal_code("411001")
        .address_line("Addr")
        .build();

    let mut builder = OrderBuilder::new(credentials)?;
    builder
        .set_order(
            OrderDetails::builder()
                .order_id("ORD1")
                .purpose("Widget")
                .amount("100.00")
                .success_url("https://shop.example/success")
                .failure_url("https://shop.example/failure")
                .build(),
        )?
        .set_customer(
            CustomerInfo::builder()
                .name("Jane")
                .email("j@x.com")
                .phone("5550001111")
                .build(),
        )
        .set_shipping_address(address.clone())
        .set_billing_address(address)
        .set_custom_fields([("udf_1", "demo")]);

    println!("{}", builder.render(&AutoSubmitForm, "checkout.html")?);

    Ok(())
}
