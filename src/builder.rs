//! Staged assembly of a checkout request.
//!
//! For details, see the [`OrderBuilder`] struct documentation.

use std::fmt::{Debug, Display};

use secrecy::ExposeSecret;

use crate::{
    canonical::{CanonicalPayload, RequestFields},
    crypto::CryptoCodec,
    errors::{Error, ErrorCode, Result},
    form::{FormPayload, FormRenderer},
    types::{
        Address, CustomFields, CustomerInfo, Environment, MerchantCredentials, OrderDetails,
    },
    validation::{Field, FormatValidator, Validator},
};

/// A group of details that must be supplied before a request can be submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Merchant credentials were validated.
    Constructor,
    Order,
    Customer,
    Shipping,
    Billing,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Constructor,
        Stage::Order,
        Stage::Customer,
        Stage::Shipping,
        Stage::Billing,
    ];

    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Constructor => "constructor",
            Stage::Order => "order",
            Stage::Customer => "customer",
            Stage::Shipping => "shipping",
            Stage::Billing => "billing",
        };
        write!(f, "{name}")
    }
}

/// The set of completed [`Stage`]s.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Stages(u8);

impl Stages {
    const COMPLETE: u8 = Stage::Constructor.bit()
        | Stage::Order.bit()
        | Stage::Customer.bit()
        | Stage::Shipping.bit()
        | Stage::Billing.bit();

    pub const fn empty() -> Self {
        Stages(0)
    }

    pub const fn all() -> Self {
        Stages(Self::COMPLETE)
    }

    pub fn insert(&mut self, stage: Stage) {
        self.0 |= stage.bit();
    }

    pub fn contains(self, stage: Stage) -> bool {
        self.0 & stage.bit() != 0
    }

    pub fn is_complete(self) -> bool {
        self.0 & Self::COMPLETE == Self::COMPLETE
    }

    pub fn iter(self) -> impl Iterator<Item = Stage> {
        Stage::ALL.into_iter().filter(move |s| self.contains(*s))
    }

    /// Stages that still need to be completed.
    pub fn missing(self) -> impl Iterator<Item = Stage> {
        Stage::ALL.into_iter().filter(move |s| !self.contains(*s))
    }
}

impl Debug for Stages {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<Stage> for Stages {
    fn from_iter<I: IntoIterator<Item = Stage>>(iter: I) -> Self {
        let mut stages = Stages::empty();
        for stage in iter {
            stages.insert(stage);
        }
        stages
    }
}

fn check<V: Validator>(validator: &V, field: Field, value: &str) -> Result<()> {
    validator.check(field, value).map_err(|err| {
        #[cfg(feature = "tracing")]
        tracing::debug!(%field, code = %err.code, "Rejected checkout input");
        Error::from(err)
    })
}

/// Accumulates a checkout request and turns it into an encrypted [`FormPayload`].
///
/// ## Stages
///
/// A request is assembled in five stages, each recorded once it succeeds:
///
/// 1. **Constructor** ([`new`](OrderBuilder::new)): validates the merchant id,
///    access token and encryption key, in that order.
/// 2. **Order** ([`set_order`](OrderBuilder::set_order)): validates the order id,
///    purpose, success URL and failure URL, in that order. The amount is not checked.
/// 3. **Customer** ([`set_customer`](OrderBuilder::set_customer)).
/// 4. **Shipping** ([`set_shipping_address`](OrderBuilder::set_shipping_address)).
/// 5. **Billing** ([`set_billing_address`](OrderBuilder::set_billing_address)).
///
/// Stages 2 to 5 can run in any order and can be repeated; the last call wins.
/// Custom fields ([`set_custom_fields`](OrderBuilder::set_custom_fields)) are optional.
///
/// A call that fails validation changes nothing.
///
/// ## Submitting
///
/// [`submit`](OrderBuilder::submit) canonicalizes the request, encrypts it with the
/// merchant key and wraps it for the gateway. Until every stage is complete it fails
/// with [`ErrorCode::IncompleteSubmission`], without saying which stage is missing;
/// use [`completed_stages`](OrderBuilder::completed_stages) for that.
///
/// ```
/// use paykun_checkout::{
///     builder::OrderBuilder,
///     types::{Address, CustomerInfo, Environment, MerchantCredentials, OrderDetails},
/// };
///
/// let address = Address::builder()
///     .country("IN")
///     .state("MH")
///     .city("Pune")
///     .postal_code("411001")
///     .address_line("Addr")
///     .build();
///
/// let mut builder = OrderBuilder::new(
///     MerchantCredentials::builder()
///         .merchant_id("M1")
///         .access_token("TOK1")
///         .encryption_key("KEY1")
///         .environment(Environment::Sandbox)
///         .build(),
/// )?;
///
/// let form = builder
///     .set_order(
///         OrderDetails::builder()
///             .order_id("ORD1")
///             .purpose("Widget")
///             .amount("100.00")
///             .success_url("https://s")
///             .failure_url("https://f")
///             .build(),
///     )?
///     .set_customer(CustomerInfo::builder().name("Jane").email("j@x.com").phone("555").build())
///     .set_shipping_address(address.clone())
///     .set_billing_address(address)
///     .submit()?;
///
/// assert_eq!(form.gateway_url, "https://sandbox.paykun.com/payment");
/// # Ok::<(), paykun_checkout::errors::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct OrderBuilder<V: Validator = FormatValidator> {
    credentials: MerchantCredentials,
    validator: V,
    order: Option<OrderDetails>,
    customer: Option<CustomerInfo>,
    shipping: Option<Address>,
    billing: Option<Address>,
    custom_fields: CustomFields,
    stages: Stages,
}

impl OrderBuilder<FormatValidator> {
    /// Validates `credentials` with the default [`FormatValidator`].
    pub fn new(credentials: MerchantCredentials) -> Result<Self> {
        Self::with_validator(credentials, FormatValidator)
    }

    /// Shorthand for [`new`](Self::new) taking the gateway's four constructor arguments.
    pub fn from_parts(
        merchant_id: impl Into<String>,
        access_token: impl Into<String>,
        encryption_key: impl Into<String>,
        is_live: bool,
    ) -> Result<Self> {
        Self::new(
            MerchantCredentials::builder()
                .merchant_id(merchant_id)
                .access_token(access_token)
                .encryption_key(encryption_key)
                .environment(Environment::from_live(is_live))
                .build(),
        )
    }
}

impl<V: Validator> OrderBuilder<V> {
    /// Validates `credentials` with a caller-supplied validator.
    pub fn with_validator(credentials: MerchantCredentials, validator: V) -> Result<Self> {
        check(&validator, Field::MerchantId, &credentials.merchant_id)?;
        check(&validator, Field::AccessToken, credentials.access_token.expose_secret())?;
        check(&validator, Field::EncryptionKey, credentials.encryption_key.expose_secret())?;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            merchant_id = %credentials.merchant_id,
            environment = %credentials.environment,
            "Checkout builder created"
        );

        let mut stages = Stages::empty();
        stages.insert(Stage::Constructor);

        Ok(Self {
            credentials,
            validator,
            order: None,
            customer: None,
            shipping: None,
            billing: None,
            custom_fields: CustomFields::default(),
            stages,
        })
    }

    fn complete(&mut self, stage: Stage) {
        self.stages.insert(stage);

        #[cfg(feature = "tracing")]
        tracing::trace!(%stage, "Checkout stage completed");
    }

    /// Sets what is being paid for and where the customer returns to.
    pub fn set_order(&mut self, order: OrderDetails) -> Result<&mut Self> {
        check(&self.validator, Field::OrderId, &order.order_id)?;
        check(&self.validator, Field::Purpose, &order.purpose)?;
        check(&self.validator, Field::SuccessUrl, &order.success_url)?;
        check(&self.validator, Field::FailureUrl, &order.failure_url)?;

        self.order = Some(order);
        self.complete(Stage::Order);
        Ok(self)
    }

    /// Sets the paying customer. Not validated.
    pub fn set_customer(&mut self, customer: CustomerInfo) -> &mut Self {
        self.customer = Some(customer);
        self.complete(Stage::Customer);
        self
    }

    /// Sets the shipping address. Not validated.
    pub fn set_shipping_address(&mut self, address: Address) -> &mut Self {
        self.shipping = Some(address);
        self.complete(Stage::Shipping);
        self
    }

    /// Sets the billing address. Not validated.
    pub fn set_billing_address(&mut self, address: Address) -> &mut Self {
        self.billing = Some(address);
        self.complete(Stage::Billing);
        self
    }

    /// Stores any of `udf_1`..`udf_5` present in `fields`.
    ///
    /// See [`CustomFields::merge`].
    pub fn set_custom_fields<I, K, S>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, S)>,
        K: AsRef<str>,
        S: Into<String>,
    {
        self.custom_fields.merge(fields);
        self
    }

    pub fn credentials(&self) -> &MerchantCredentials {
        &self.credentials
    }

    pub fn environment(&self) -> Environment {
        self.credentials.environment
    }

    pub fn custom_fields(&self) -> &CustomFields {
        &self.custom_fields
    }

    pub fn completed_stages(&self) -> Stages {
        self.stages
    }

    pub fn is_complete(&self) -> bool {
        self.stages.is_complete()
    }

    fn request_fields(&self) -> Result<RequestFields<'_>> {
        let incomplete = || {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                missing = ?self.stages.missing().collect::<Vec<_>>(),
                "Checkout submitted before all stages completed"
            );
            Error::from(ErrorCode::IncompleteSubmission)
        };

        if !self.stages.is_complete() {
            return Err(incomplete());
        }
        match (&self.order, &self.customer, &self.shipping, &self.billing) {
            (Some(order), Some(customer), Some(shipping), Some(billing)) => Ok(
                RequestFields::from_order(order, customer, shipping, billing, &self.custom_fields),
            ),
            _ => Err(incomplete()),
        }
    }

    /// The canonical string [`submit`](Self::submit) would encrypt.
    pub fn canonical_payload(&self) -> Result<CanonicalPayload> {
        Ok(self.request_fields()?.canonicalize())
    }

    /// Canonicalizes, encrypts and wraps the request for the gateway.
    pub fn submit(&self) -> Result<FormPayload> {
        let fields = self.request_fields()?;
        let canonical = fields.canonicalize();
        let codec = CryptoCodec::new(self.credentials.encryption_key.expose_secret());
        let encrypted = codec.encrypt(canonical.as_str())?;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            fields = canonical.keys().count(),
            environment = %self.credentials.environment,
            "Checkout request encrypted"
        );

        Ok(FormPayload::assemble(
            encrypted,
            &self.credentials.merchant_id,
            self.credentials.access_token.expose_secret(),
            self.credentials.environment,
        ))
    }

    /// Submits, then renders the resulting form with `renderer`.
    pub fn render<R>(&self, renderer: &R, template: &str) -> Result<String>
    where
        R: FormRenderer,
        R::Error: Send + Sync + 'static,
    {
        let payload = self.submit()?;
        renderer
            .render(template, &payload)
            .map_err(|err| Error::Render(Box::new(err)))
    }
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use super::*;
    use crate::{errors::ValidationError, types::GATEWAY_URL_SANDBOX};

    fn credentials() -> MerchantCredentials {
        MerchantCredentials::builder()
            .merchant_id("M1")
            .access_token("TOK1")
            .encryption_key("KEY1")
            .environment(Environment::Sandbox)
            .build()
    }

    fn order() -> OrderDetails {
        OrderDetails::builder()
            .order_id("ORD1")
            .purpose("Widget")
            .amount("100.00")
            .success_url("https://s")
            .failure_url("https://f")
            .build()
    }

    fn customer() -> CustomerInfo {
        CustomerInfo::builder()
            .name("Jane")
            .email("j@x.com")
            .phone("555")
            .build()
    }

    fn address() -> Address {
        Address::builder()
            .country("IN")
            .state("MH")
            .city("Pune")
            .postal_code("411001")
            .address_line("Addr")
            .build()
    }

    fn complete_builder() -> OrderBuilder {
        let mut builder = OrderBuilder::new(credentials()).unwrap();
        builder
            .set_order(order())
            .unwrap()
            .set_customer(customer())
            .set_shipping_address(address())
            .set_billing_address(address());
        builder
    }

    fn code_of<T: Debug>(result: Result<T>) -> ErrorCode {
        result.unwrap_err().code().expect("validation error")
    }

    #[test]
    fn stages_bitmask() {
        let mut stages = Stages::empty();
        assert!(!stages.is_complete());
        stages.insert(Stage::Order);
        stages.insert(Stage::Order);
        assert!(stages.contains(Stage::Order));
        assert!(!stages.contains(Stage::Billing));
        assert_eq!(stages.iter().collect::<Vec<_>>(), vec![Stage::Order]);

        let all: Stages = Stage::ALL.into_iter().collect();
        assert_eq!(all, Stages::all());
        assert!(all.is_complete());
        assert_eq!(all.missing().count(), 0);
        assert_eq!(format!("{:?}", Stages::empty()), "{}");
    }

    #[test]
    fn new_builder_has_only_constructor_stage() {
        let builder = OrderBuilder::new(credentials()).unwrap();
        assert_eq!(
            builder.completed_stages().iter().collect::<Vec<_>>(),
            vec![Stage::Constructor]
        );
        assert!(!builder.is_complete());
    }

    #[test]
    fn from_parts_maps_live_flag() {
        let builder = OrderBuilder::from_parts("M1", "TOK1", "KEY1", true).unwrap();
        assert_eq!(builder.environment(), Environment::Production);

        let builder = OrderBuilder::from_parts("M1", "TOK1", "KEY1", false).unwrap();
        assert_eq!(builder.environment(), Environment::Sandbox);
    }

    #[test]
    fn constructor_checks_in_order() {
        let err = OrderBuilder::from_parts("", "", "", false);
        assert_eq!(code_of(err), ErrorCode::InvalidMerchantId);

        let err = OrderBuilder::from_parts("M1", "", "", false);
        assert_eq!(code_of(err), ErrorCode::InvalidAccessToken);

        let err = OrderBuilder::from_parts("M1", "TOK1", "", false);
        assert_eq!(code_of(err), ErrorCode::InvalidEncryptionKey);
    }

    #[test]
    fn set_order_checks_in_order() {
        let mut builder = OrderBuilder::new(credentials()).unwrap();

        let bad = OrderDetails {
            order_id: String::new(),
            purpose: String::new(),
            success_url: "bad".into(),
            failure_url: "bad".into(),
            ..order()
        };
        assert_eq!(
            code_of(builder.set_order(bad.clone())),
            ErrorCode::InvalidOrderId
        );

        let bad = OrderDetails {
            order_id: "ORD1".into(),
            ..bad
        };
        assert_eq!(
            code_of(builder.set_order(bad.clone())),
            ErrorCode::InvalidPurpose
        );

        let bad = OrderDetails {
            purpose: "Widget".into(),
            ..bad
        };
        assert_eq!(
            code_of(builder.set_order(bad.clone())),
            ErrorCode::InvalidSuccessUrl
        );

        let bad = OrderDetails {
            success_url: "https://s".into(),
            ..bad
        };
        assert_eq!(code_of(builder.set_order(bad)), ErrorCode::InvalidFailureUrl);
    }

    #[test]
    fn amount_is_not_validated() {
        let mut builder = OrderBuilder::new(credentials()).unwrap();
        let order = OrderDetails {
            amount: "not a number".into(),
            ..order()
        };
        assert!(builder.set_order(order).is_ok());
    }

    #[test]
    fn failed_set_order_changes_nothing() {
        let mut builder = complete_builder();
        let before = builder.canonical_payload().unwrap();

        let bad = OrderDetails {
            order_id: "ORD2".into(),
            failure_url: "nope".into(),
            ..order()
        };
        assert!(builder.set_order(bad).is_err());

        assert!(builder.is_complete());
        assert_eq!(builder.canonical_payload().unwrap(), before);

        let mut fresh = OrderBuilder::new(credentials()).unwrap();
        assert!(fresh.set_order(OrderDetails { purpose: " ".into(), ..order() }).is_err());
        assert!(!fresh.completed_stages().contains(Stage::Order));
    }

    #[test]
    fn each_missing_stage_blocks_submit() {
        type Setter = fn(&mut OrderBuilder);
        let setters: [(Stage, Setter); 4] = [
            (Stage::Order, |b: &mut OrderBuilder| {
                b.set_order(order()).unwrap();
            }),
            (Stage::Customer, |b: &mut OrderBuilder| {
                b.set_customer(customer());
            }),
            (Stage::Shipping, |b: &mut OrderBuilder| {
                b.set_shipping_address(address());
            }),
            (Stage::Billing, |b: &mut OrderBuilder| {
                b.set_billing_address(address());
            }),
        ];

        for (skipped, _) in setters {
            let mut builder = OrderBuilder::new(credentials()).unwrap();
            for (stage, set) in setters {
                if stage != skipped {
                    set(&mut builder);
                }
            }
            assert_eq!(
                code_of(builder.submit()),
                ErrorCode::IncompleteSubmission,
                "submit succeeded without {skipped}"
            );
            assert_eq!(builder.completed_stages().missing().collect::<Vec<_>>(), vec![skipped]);
        }

        for (only, set) in setters {
            let mut builder = OrderBuilder::new(credentials()).unwrap();
            set(&mut builder);
            assert_eq!(
                code_of(builder.submit()),
                ErrorCode::IncompleteSubmission,
                "submit succeeded with only {only}"
            );
        }
    }

    #[test]
    fn stage_order_does_not_matter() {
        let expected = complete_builder().submit().unwrap();

        let mut builder = OrderBuilder::new(credentials()).unwrap();
        builder
            .set_billing_address(address())
            .set_customer(customer())
            .set_shipping_address(address())
            .set_order(order())
            .unwrap();

        assert_eq!(builder.submit().unwrap(), expected);
    }

    #[test]
    fn concrete_scenario() {
        let builder = complete_builder();
        let canonical = builder.canonical_payload().unwrap();

        assert_eq!(
            canonical.keys().collect::<Vec<_>>(),
            vec![
                "amount",
                "billing_address",
                "billing_city",
                "billing_country",
                "billing_state",
                "billing_zip",
                "currency",
                "customer_email",
                "customer_name",
                "customer_phone",
                "failure_url",
                "order_no",
                "product_name",
                "shipping_address",
                "shipping_city",
                "shipping_country",
                "shipping_state",
                "shipping_zip",
                "success_url",
            ]
        );
        assert_eq!(
            canonical.as_str(),
            "amount::100.00;billing_address::Addr;billing_city::Pune;billing_country::IN;\
             billing_state::MH;billing_zip::411001;currency::INR;customer_email::j@x.com;\
             customer_name::Jane;customer_phone::555;failure_url::https://f;order_no::ORD1;\
             product_name::Widget;shipping_address::Addr;shipping_city::Pune;\
             shipping_country::IN;shipping_state::MH;shipping_zip::411001;success_url::https://s"
        );

        let form = builder.submit().unwrap();
        assert_eq!(form.gateway_url, GATEWAY_URL_SANDBOX);
        assert_eq!(form.merchant_id, "M1");
        assert_eq!(form.access_token, "TOK1");
        assert_eq!(
            CryptoCodec::new("KEY1")
                .decrypt(&form.encrypted_request)
                .unwrap(),
            canonical.as_str()
        );
    }

    #[test]
    fn custom_fields_are_optional_and_merged() {
        let mut builder = complete_builder();
        builder.set_custom_fields([("udf_1", "alpha"), ("udf_3", "gamma")]);
        builder.set_custom_fields([("udf_1", "beta")]);

        let canonical = builder.canonical_payload().unwrap();
        assert!(canonical.as_str().ends_with("udf_1::beta;udf_3::gamma"));
        assert!(!canonical.as_str().contains("udf_2::"));
        assert_eq!(builder.custom_fields().udf_3.as_deref(), Some("gamma"));
    }

    #[test]
    fn custom_fields_do_not_complete_stages() {
        let mut builder = OrderBuilder::new(credentials()).unwrap();
        builder.set_custom_fields([("udf_1", "x")]);
        assert_eq!(code_of(builder.submit()), ErrorCode::IncompleteSubmission);
    }

    #[test]
    fn builder_debug_keeps_secrets_out() {
        let debug = format!("{:?}", complete_builder());
        assert!(debug.contains("M1"));
        assert!(!debug.contains("TOK1"));
        assert!(!debug.contains("KEY1"));
    }

    #[test]
    fn non_default_currency_reaches_payload() {
        let mut builder = OrderBuilder::new(credentials()).unwrap();
        builder
            .set_order(OrderDetails {
                purpose: "W".into(),
                amount: "0.00".into(),
                currency: "USD".into(),
                ..order()
            })
            .unwrap()
            .set_customer(CustomerInfo::builder().name(" ").email("").phone("0").build())
            .set_shipping_address(Address::default())
            .set_billing_address(Address::default())
            .set_custom_fields([("udf_5", "x")]);

        let canonical = builder.canonical_payload().unwrap();
        assert_eq!(
            canonical.as_str(),
            "amount::0.00;currency::USD;customer_name:: ;failure_url::https://f;\
             order_no::ORD1;product_name::W;success_url::https://s;udf_5::x"
        );

        let form = builder.submit().unwrap();
        let decrypted = CryptoCodec::new("KEY1")
            .decrypt(&form.encrypted_request)
            .unwrap();
        assert!(decrypted.contains("currency::USD;"));
        assert_eq!(decrypted, canonical.as_str());
    }

    #[test]
    fn custom_validator_is_used() {
        #[derive(Debug)]
        struct NoSandboxOrders;
        impl Validator for NoSandboxOrders {
            fn check(&self, field: Field, value: &str) -> std::result::Result<(), ValidationError> {
                match field {
                    Field::OrderId if value.starts_with("TEST") => Err(field.reject("test order")),
                    _ => Ok(()),
                }
            }
        }

        let mut builder = OrderBuilder::with_validator(credentials(), NoSandboxOrders).unwrap();
        let err = builder
            .set_order(OrderDetails { order_id: "TEST-1".into(), ..order() })
            .unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::InvalidOrderId));
        assert!(builder.set_order(order()).is_ok());
    }

    #[test]
    fn render_delegates_to_renderer() {
        struct Plain;
        impl FormRenderer for Plain {
            type Error = Infallible;

            fn render(&self, template: &str, payload: &FormPayload) -> std::result::Result<String, Infallible> {
                Ok(format!("{template}:{}", payload.merchant_id))
            }
        }

        let rendered = complete_builder().render(&Plain, "form.html").unwrap();
        assert_eq!(rendered, "form.html:M1");

        let incomplete = OrderBuilder::new(credentials()).unwrap();
        assert_eq!(
            code_of(incomplete.render(&Plain, "form.html")),
            ErrorCode::IncompleteSubmission
        );
    }

    #[test]
    fn render_errors_are_wrapped() {
        #[derive(Debug, thiserror::Error)]
        #[error("template {0} not found")]
        struct Missing(String);

        struct Failing;
        impl FormRenderer for Failing {
            type Error = Missing;

            fn render(&self, template: &str, _payload: &FormPayload) -> std::result::Result<String, Missing> {
                Err(Missing(template.to_string()))
            }
        }

        let err = complete_builder().render(&Failing, "form.html").unwrap_err();
        assert!(matches!(err, Error::Render(_)));
        assert_eq!(err.to_string(), "Render error: template form.html not found");
    }
}
