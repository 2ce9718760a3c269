//! Built-in manifest templates, embedded at compile time.
pub const POSTGRES_TEMPLATE: &str = "postgres-statefulset.hbs";
pub const DEPLOYMENT_TEMPLATE: &str = "deployment.hbs";
pub const SERVICE_TEMPLATE: &str = "service.hbs";
pub const INGRESS_TEMPLATE: &str = "ingress.hbs";

pub const POSTGRES_STATEFULSET_HBS: &str = include_str!("../templates/postgres-statefulset.hbs");
pub const DEPLOYMENT_HBS: &str = include_str!("../templates/deployment.hbs");
pub const SERVICE_HBS: &str = include_str!("../templates/service.hbs");
pub const INGRESS_HBS: &str = include_str!("../templates/ingress.hbs");

/// Identifier and source of every built-in template.
pub const EMBEDDED: [(&str, &str); 4] = [
    (POSTGRES_TEMPLATE, POSTGRES_STATEFULSET_HBS),
    (DEPLOYMENT_TEMPLATE, DEPLOYMENT_HBS),
    (SERVICE_TEMPLATE, SERVICE_HBS),
    (INGRESS_TEMPLATE, INGRESS_HBS),
];
