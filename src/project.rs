// project.rs — Narrow store over the on-disk Xcode project
//
// The pbxproj file is an object graph keyed by opaque ids:
//   rootObject → PBXProject.targets → PBXNativeTarget.buildConfigurationList
//   → XCConfigurationList.buildConfigurations → XCBuildConfiguration
// This module exposes only what the pipeline needs: load, an ordered
// snapshot of targets/configurations, a single-setting write, and save.
// Serialization details belong to the plist crate; the tree is written back
// once, as XML, and only when the caller asks.

use plist::{Dictionary, Value};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

#[derive(Debug)]
pub struct ProjectTree {
    pbxproj_path: PathBuf,
    root: Value,
}

/// Snapshot of one target, in graph order.
#[derive(Debug, Clone)]
pub struct TargetRef {
    pub product_name: String,
    pub product_type: String,
    pub configurations: Vec<ConfigRef>,
}

#[derive(Debug, Clone)]
pub struct ConfigRef {
    pub id: String,
    pub name: String,
}

impl ProjectTree {
    /// Load the project from an `.xcodeproj` bundle path.
    pub fn load(bundle: &Path) -> Result<Self> {
        if !bundle.exists() {
            return Err(Error::ConfigurationPathInvalid {
                what: "project",
                path: bundle.to_path_buf(),
            });
        }
        let pbxproj_path = bundle.join("project.pbxproj");
        if !pbxproj_path.exists() {
            return Err(Error::ConfigurationPathInvalid {
                what: "project",
                path: pbxproj_path,
            });
        }
        let root = Value::from_file(&pbxproj_path)?;
        Ok(ProjectTree { pbxproj_path, root })
    }

    /// Ordered snapshot of all targets and their build configurations.
    pub fn targets(&self) -> Result<Vec<TargetRef>> {
        let top = self
            .root
            .as_dictionary()
            .ok_or_else(|| malformed("project root is not a dictionary"))?;
        let objects = dict_entry(top, "objects")?;
        let root_id = str_entry(top, "rootObject")?;
        let project = object(objects, root_id)?;

        let mut out = Vec::new();
        for target_id in array_entry(project, "targets")? {
            let target_id = as_object_id(target_id)?;
            let target = object(objects, target_id)?;

            let name = target.get("name").and_then(Value::as_string);
            let product_name = target
                .get("productName")
                .and_then(Value::as_string)
                .or(name)
                .unwrap_or_default()
                .to_string();
            let product_type = target
                .get("productType")
                .and_then(Value::as_string)
                .unwrap_or_default()
                .to_string();

            let list = object(objects, str_entry(target, "buildConfigurationList")?)?;
            let mut configurations = Vec::new();
            for config_id in array_entry(list, "buildConfigurations")? {
                let config_id = as_object_id(config_id)?;
                let config = object(objects, config_id)?;
                configurations.push(ConfigRef {
                    id: config_id.to_string(),
                    name: str_entry(config, "name")?.to_string(),
                });
            }

            out.push(TargetRef {
                product_name,
                product_type,
                configurations,
            });
        }
        Ok(out)
    }

    /// Set one build setting on a configuration, creating the buildSettings
    /// dictionary and the key as needed, overwriting any existing value.
    pub fn set_build_setting(&mut self, config_id: &str, key: &str, value: &str) -> Result<()> {
        let top = self
            .root
            .as_dictionary_mut()
            .ok_or_else(|| malformed("project root is not a dictionary"))?;
        let objects = top
            .get_mut("objects")
            .and_then(Value::as_dictionary_mut)
            .ok_or_else(|| malformed("missing objects table"))?;
        let config = objects
            .get_mut(config_id)
            .and_then(Value::as_dictionary_mut)
            .ok_or_else(|| malformed(format!("unknown configuration object {config_id}")))?;

        if !config.contains_key("buildSettings") {
            config.insert("buildSettings".to_string(), Value::Dictionary(Dictionary::new()));
        }
        let settings = config
            .get_mut("buildSettings")
            .and_then(Value::as_dictionary_mut)
            .ok_or_else(|| malformed(format!("buildSettings of {config_id} is not a dictionary")))?;
        settings.insert(key.to_string(), Value::String(value.to_string()));
        Ok(())
    }

    /// Read back one build setting (primarily for reporting and tests).
    pub fn build_setting(&self, config_id: &str, key: &str) -> Option<&str> {
        self.root
            .as_dictionary()?
            .get("objects")?
            .as_dictionary()?
            .get(config_id)?
            .as_dictionary()?
            .get("buildSettings")?
            .as_dictionary()?
            .get(key)?
            .as_string()
    }

    /// Persist the tree back to its pbxproj file. Called exactly once per
    /// successful run, after all mutation.
    pub fn save(&self) -> Result<()> {
        self.root.to_file_xml(&self.pbxproj_path)?;
        Ok(())
    }

    pub fn pbxproj_path(&self) -> &Path {
        &self.pbxproj_path
    }
}

/// Find the sole `.xcodeproj` bundle in `dir`.
pub fn discover(dir: &Path) -> Result<PathBuf> {
    let mut candidates = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "xcodeproj") {
            candidates.push(path);
        }
    }
    candidates.sort();
    match candidates.len() {
        0 => Err(Error::ProjectNotFound(dir.to_path_buf())),
        1 => Ok(candidates.remove(0)),
        _ => Err(Error::ProjectAmbiguous(dir.to_path_buf())),
    }
}

fn malformed(msg: impl Into<String>) -> Error {
    Error::ProjectMalformed(msg.into())
}

fn dict_entry<'a>(dict: &'a Dictionary, key: &str) -> Result<&'a Dictionary> {
    dict.get(key)
        .and_then(Value::as_dictionary)
        .ok_or_else(|| malformed(format!("missing dictionary entry {key}")))
}

fn str_entry<'a>(dict: &'a Dictionary, key: &str) -> Result<&'a str> {
    dict.get(key)
        .and_then(Value::as_string)
        .ok_or_else(|| malformed(format!("missing string entry {key}")))
}

fn array_entry<'a>(dict: &'a Dictionary, key: &str) -> Result<&'a [Value]> {
    dict.get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .ok_or_else(|| malformed(format!("missing array entry {key}")))
}

fn object<'a>(objects: &'a Dictionary, id: &str) -> Result<&'a Dictionary> {
    objects
        .get(id)
        .and_then(Value::as_dictionary)
        .ok_or_else(|| malformed(format!("dangling object reference {id}")))
}

fn as_object_id(value: &Value) -> Result<&str> {
    value
        .as_string()
        .ok_or_else(|| malformed("object reference is not a string"))
}
