pub mod pipeline;
pub mod ports;
pub mod resolver;
pub mod rules;
pub mod tenant_resolver;
pub mod tenants;

#[cfg(test)]
pub mod test_support;
