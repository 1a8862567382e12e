//! Foundation container loader (macOS)

#![allow(unused_unsafe)]

use std::path::PathBuf;

use objc2::rc::Retained;
use objc2_foundation::{NSBundle, NSString};

use crate::application::ports::{BundleIntrospection, BundleRef};

/// Answers identity queries through `NSBundle`
pub struct FoundationBundles;

impl FoundationBundles {
    fn load(bundle: &BundleRef) -> Option<Retained<NSBundle>> {
        match bundle {
            BundleRef::Main => Some(unsafe { NSBundle::mainBundle() }),
            BundleRef::At(path) => {
                let path = NSString::from_str(&path.to_string_lossy());
                unsafe { NSBundle::bundleWithPath(&path) }
            }
        }
    }
}

impl BundleIntrospection for FoundationBundles {
    fn container_path(&self, bundle: &BundleRef) -> Option<PathBuf> {
        let bundle = Self::load(bundle)?;
        // Through bundleURL so a redirected main bundle is honoured
        let url = unsafe { bundle.bundleURL() };
        let path = unsafe { url.path() }?;
        Some(PathBuf::from(path.to_string()))
    }

    fn identifier(&self, bundle: &BundleRef) -> Option<String> {
        let bundle = Self::load(bundle)?;
        unsafe { bundle.bundleIdentifier() }.map(|id| id.to_string())
    }
}
