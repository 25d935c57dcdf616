//! Contains the native image extension

use assemble_graal_core::lazy_evaluation::{Prop, Provider, VecProp};

use crate::resolver::ExtensionSettings;

/// The annotation processor attached to source sets when native images are enabled
pub const DEFAULT_PROCESSOR_DEPENDENCY: &str = "io.micronaut:micronaut-graal";

/// Settings for annotation processing
#[derive(Debug)]
pub struct AnnotationProcessing {
    /// Source sets besides `main` and `test` that should also get the annotation processor.
    /// Unset unless configured.
    pub additional_source_sets: VecProp<String>,
}

/// The native image extension, registered as `graal`
#[derive(Debug)]
pub struct NativeImageExtension {
    /// Whether native images should be built. Unset means disabled.
    pub enable_native_image: Prop<bool>,
    /// Annotation processing settings
    pub processing: AnnotationProcessing,
    /// The dependency notation of the annotation processor
    pub processor_dependency: Prop<String>,
}

impl NativeImageExtension {
    /// Creates a new instance of the extension
    pub fn new() -> Self {
        Self {
            enable_native_image: Prop::with_name("enableNativeImage"),
            processing: AnnotationProcessing {
                additional_source_sets: VecProp::with_name("additionalSourceSets"),
            },
            processor_dependency: Prop::with_value(DEFAULT_PROCESSOR_DEPENDENCY.to_string()),
        }
    }

    /// Takes a snapshot of the current values of this extension
    pub fn settings(&self) -> ExtensionSettings {
        ExtensionSettings {
            native_image_enabled: self.enable_native_image.try_get().unwrap_or(false),
            additional_source_set_names: self.processing.additional_source_sets.try_get(),
        }
    }

    /// The processor dependency notation to attach
    pub fn processor_dependency(&self) -> String {
        self.processor_dependency
            .try_get()
            .unwrap_or_else(|| DEFAULT_PROCESSOR_DEPENDENCY.to_string())
    }
}

impl Default for NativeImageExtension {
    fn default() -> Self {
        Self::new()
    }
}
