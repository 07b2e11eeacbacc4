//! Hand-off of the finished model to a renderer.

use std::convert::Infallible;

use cg_core::{ClientCollection, GenerateOptions};

/// Consumes a finished [`ClientCollection`].
///
/// Renderers and writers implement this. The builder never calls a sink with
/// a partially assembled collection.
///
/// # Examples
///
/// ```
/// use cg_builder::ClientSink;
/// use cg_core::{ClientCollection, GenerateOptions};
///
/// struct CountingSink(usize);
///
/// impl ClientSink for CountingSink {
///     type Error = std::convert::Infallible;
///
///     fn emit(
///         &mut self,
///         collection: &ClientCollection,
///         _options: &GenerateOptions,
///     ) -> Result<(), Self::Error> {
///         self.0 += collection.clients.len();
///         Ok(())
///     }
/// }
///
/// let mut sink = CountingSink(0);
/// sink.emit(&ClientCollection::default(), &GenerateOptions::default()).unwrap();
/// assert_eq!(sink.0, 0);
/// ```
pub trait ClientSink {
    /// Error type returned when emission fails.
    type Error;

    /// Emits the collection.
    fn emit(
        &mut self,
        collection: &ClientCollection,
        options: &GenerateOptions,
    ) -> Result<(), Self::Error>;
}

/// A sink that keeps every emitted collection in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    collections: Vec<ClientCollection>,
}

impl CollectingSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the collections emitted so far.
    #[must_use]
    pub fn collections(&self) -> &[ClientCollection] {
        &self.collections
    }

    /// Consumes the sink, returning the emitted collections.
    #[must_use]
    pub fn into_collections(self) -> Vec<ClientCollection> {
        self.collections
    }
}

impl ClientSink for CollectingSink {
    type Error = Infallible;

    fn emit(
        &mut self,
        collection: &ClientCollection,
        _options: &GenerateOptions,
    ) -> Result<(), Self::Error> {
        self.collections.push(collection.clone());
        Ok(())
    }
}
