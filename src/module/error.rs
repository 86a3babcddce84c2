use std::fmt;

/// Route table construction error
///
/// Returned by [`super::RouteTable::from_registry`] and
/// [`super::ModuleRegistry::register`] when the module graph is malformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteTableError {
    /// An import, export or the root names a module that was never registered
    UnknownModule(String),
    /// Following imports leads back to a module already on the path.
    ///
    /// The path starts and ends with the same module name.
    ModuleCycle(Vec<String>),
    /// Two modules were registered under the same name
    DuplicateModule(String),
}

impl fmt::Display for RouteTableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteTableError::UnknownModule(name) => {
                write!(f, "route table error: module '{}' is not registered", name)
            }
            RouteTableError::ModuleCycle(path) => {
                write!(
                    f,
                    "route table error: module import cycle detected: {}",
                    path.join(" -> ")
                )
            }
            RouteTableError::DuplicateModule(name) => {
                write!(
                    f,
                    "route table error: module '{}' is registered more than once",
                    name
                )
            }
        }
    }
}

impl std::error::Error for RouteTableError {}
