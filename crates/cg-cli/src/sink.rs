//! JSON sinks for the finished client model.
//!
//! - [`JsonDirectorySink`] writes one file per client under an output root,
//!   at `<root>/<location>/<Name>.json`
//! - [`JsonWriterSink`] writes the whole collection to a single writer

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use cg_builder::ClientSink;
use cg_core::{AmbiguousTypes, Client, ClientCollection, GenerateOptions};
use color_eyre::eyre::WrapErr;
use serde::Serialize;
use tracing::debug;

/// Per-client document: the client plus what a renderer needs to emit it.
#[derive(Serialize)]
struct ClientDocument<'a> {
    #[serde(flatten)]
    client: &'a Client,
    ambiguous_types: &'a AmbiguousTypes,
    use_api_responses: bool,
}

/// Whole-collection document.
#[derive(Serialize)]
struct CollectionDocument<'a> {
    #[serde(flatten)]
    collection: &'a ClientCollection,
    use_api_responses: bool,
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}

/// Writes each client to its own JSON file below a root directory.
#[derive(Debug)]
pub struct JsonDirectorySink {
    root: Utf8PathBuf,
    pretty: bool,
    written: Vec<Utf8PathBuf>,
}

impl JsonDirectorySink {
    /// Creates a sink writing below `root`.
    #[must_use]
    pub fn new(root: &Utf8Path, pretty: bool) -> Self {
        Self {
            root: root.to_owned(),
            pretty,
            written: Vec::new(),
        }
    }

    /// Returns the files written so far.
    #[must_use]
    pub fn written(&self) -> &[Utf8PathBuf] {
        &self.written
    }
}

impl ClientSink for JsonDirectorySink {
    type Error = color_eyre::Report;

    fn emit(
        &mut self,
        collection: &ClientCollection,
        options: &GenerateOptions,
    ) -> Result<(), Self::Error> {
        for client in &collection.clients {
            let dir = self.root.join(&client.location);
            std::fs::create_dir_all(dir.as_std_path())
                .wrap_err_with(|| format!("failed to create directory {dir}"))?;

            let path = dir.join(format!("{}.json", client.name));
            let document = ClientDocument {
                client,
                ambiguous_types: &collection.ambiguous_types,
                use_api_responses: options.use_api_responses,
            };
            let content = to_json(&document, self.pretty)?;
            std::fs::write(path.as_std_path(), content)
                .wrap_err_with(|| format!("failed to write {path}"))?;

            debug!(path = %path, client = %client.name, "Client written");
            self.written.push(path);
        }
        Ok(())
    }
}

/// Writes the whole collection as one JSON document.
#[derive(Debug)]
pub struct JsonWriterSink<W> {
    writer: W,
    pretty: bool,
}

impl<W: Write> JsonWriterSink<W> {
    /// Creates a sink writing to `writer`.
    pub fn new(writer: W, pretty: bool) -> Self {
        Self { writer, pretty }
    }
}

impl<W: Write> ClientSink for JsonWriterSink<W> {
    type Error = color_eyre::Report;

    fn emit(
        &mut self,
        collection: &ClientCollection,
        options: &GenerateOptions,
    ) -> Result<(), Self::Error> {
        let document = CollectionDocument {
            collection,
            use_api_responses: options.use_api_responses,
        };
        let content = to_json(&document, self.pretty)?;
        writeln!(self.writer, "{content}")?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cg_builder::ClientModelBuilder;
    use cg_core::{EndpointOwner, RawEndpoint, ResponseType, ServiceDescription, TypeRef};

    fn collection() -> ClientCollection {
        let get = |namespace: &str, name: &str, path: &str| {
            RawEndpoint::new("GET", path)
                .with_owner(EndpointOwner::controller(namespace, name))
                .with_response(ResponseType::new(200, TypeRef::string()))
        };
        let service = ServiceDescription {
            endpoints: vec![
                get("Api.Controllers", "Items", "items"),
                get("Api.Controllers.Admin", "Users", "admin/users"),
            ],
            ..ServiceDescription::default()
        };

        ClientModelBuilder::new(GenerateOptions::default())
            .unwrap()
            .build(&service)
            .unwrap()
            .collection
    }

    #[test]
    fn test_directory_sink_writes_one_file_per_client() {
        let temp = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();

        let mut sink = JsonDirectorySink::new(&root, true);
        sink.emit(&collection(), &GenerateOptions::default()).unwrap();

        let written: Vec<&str> = sink
            .written()
            .iter()
            .map(|path| path.strip_prefix(&root).unwrap().as_str())
            .collect();
        assert_eq!(written, vec!["IItemsApi.json", "Admin/IUsersApi.json"]);

        let content = std::fs::read_to_string(root.join("Admin/IUsersApi.json")).unwrap();
        let json: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(json["name"], "IUsersApi");
        assert_eq!(json["namespace"], "Client.Admin");
        assert_eq!(json["use_api_responses"], false);
        assert!(json["ambiguous_types"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_writer_sink_writes_whole_collection() {
        let options = GenerateOptions {
            use_api_responses: true,
            ..GenerateOptions::default()
        };
        let mut buffer = Vec::new();
        JsonWriterSink::new(&mut buffer, false)
            .emit(&collection(), &options)
            .unwrap();

        let output = String::from_utf8(buffer).unwrap();
        assert!(output.ends_with('\n'));
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json["clients"].as_array().unwrap().len(), 2);
        assert_eq!(json["use_api_responses"], true);
        assert_eq!(json["clients"][0]["endpoint_methods"][0]["http_method"], "GET");
    }
}
