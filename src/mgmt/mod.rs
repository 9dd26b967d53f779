/*!
 * Management Module
 * Per-scope management/introspection namespaces
 */

mod namespace;

pub use namespace::Namespace;
