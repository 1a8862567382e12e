//! Main-bundle redirection (macOS)
//!
//! The notification service reads the caller's identity from
//! `NSBundle.mainBundle` and offers no injection point, so the
//! `bundleURL`, `bundleIdentifier` and `infoDictionary` getters are replaced
//! process-wide. The replacements answer with the synthetic container for
//! the main bundle only and forward every other bundle to the original
//! getter.
//! All shared state lives in [`REDIRECT`], written once.

#![allow(unused_unsafe)]

use std::mem;
use std::ptr;
use std::sync::OnceLock;

use objc2::rc::Retained;
use objc2::runtime::{AnyObject, Imp, Method, Sel};
use objc2::{class, sel};
use objc2_foundation::{NSBundle, NSString, NSURL};
use tracing::debug;

use crate::application::ports::{IdentityOverride, OverrideUnavailable};
use crate::domain::identity::IdentityDescriptor;

type Getter = unsafe extern "C-unwind" fn(*mut AnyObject, Sel) -> *mut AnyObject;

struct Redirect {
    /// Address of the main bundle singleton
    main_bundle: usize,
    /// Leaked `NSURL *`, lives for the rest of the process
    bundle_url: usize,
    /// Leaked `NSString *`, lives for the rest of the process
    identifier: usize,
    /// Leaked `NSDictionary *` read from the container, or 0 when the
    /// container could not be loaded as a bundle
    info_dictionary: usize,
    original_url: Getter,
    original_identifier: Getter,
    original_info: Getter,
}

static REDIRECT: OnceLock<Redirect> = OnceLock::new();

unsafe extern "C-unwind" fn redirected_bundle_url(this: *mut AnyObject, cmd: Sel) -> *mut AnyObject {
    match REDIRECT.get() {
        Some(redirect) if this as usize == redirect.main_bundle => {
            redirect.bundle_url as *mut AnyObject
        }
        Some(redirect) => (redirect.original_url)(this, cmd),
        None => ptr::null_mut(),
    }
}

unsafe extern "C-unwind" fn redirected_bundle_identifier(
    this: *mut AnyObject,
    cmd: Sel,
) -> *mut AnyObject {
    match REDIRECT.get() {
        Some(redirect) if this as usize == redirect.main_bundle => {
            redirect.identifier as *mut AnyObject
        }
        Some(redirect) => (redirect.original_identifier)(this, cmd),
        None => ptr::null_mut(),
    }
}

unsafe extern "C-unwind" fn redirected_info_dictionary(
    this: *mut AnyObject,
    cmd: Sel,
) -> *mut AnyObject {
    match REDIRECT.get() {
        Some(redirect) if this as usize == redirect.main_bundle && redirect.info_dictionary != 0 => {
            redirect.info_dictionary as *mut AnyObject
        }
        Some(redirect) => (redirect.original_info)(this, cmd),
        None => ptr::null_mut(),
    }
}

fn getter(method: Option<&Method>, name: &str) -> Result<&Method, OverrideUnavailable> {
    method.ok_or_else(|| OverrideUnavailable(format!("NSBundle has no {} getter", name)))
}

/// Redirects `NSBundle.mainBundle` to the synthetic container
pub struct BundleOverride;

impl IdentityOverride for BundleOverride {
    fn apply(&self, descriptor: &IdentityDescriptor) -> Result<(), OverrideUnavailable> {
        if REDIRECT.get().is_some() {
            return Ok(());
        }

        let bundle_class = class!(NSBundle);
        let url_method = getter(bundle_class.instance_method(sel!(bundleURL)), "bundleURL")?;
        let identifier_method = getter(
            bundle_class.instance_method(sel!(bundleIdentifier)),
            "bundleIdentifier",
        )?;
        let info_method = getter(
            bundle_class.instance_method(sel!(infoDictionary)),
            "infoDictionary",
        )?;

        let main_bundle = unsafe { NSBundle::mainBundle() };
        let path = NSString::from_str(&descriptor.container_path.to_string_lossy());
        let url = unsafe { NSURL::fileURLWithPath(&path) };
        let identifier = NSString::from_str(&descriptor.identifier);
        let info = unsafe { NSBundle::bundleWithPath(&path) }
            .and_then(|container| unsafe { container.infoDictionary() });
        if info.is_none() {
            debug!(container = %descriptor.container_path.display(), "container has no readable manifest");
        }

        let redirect = Redirect {
            main_bundle: Retained::as_ptr(&main_bundle) as usize,
            bundle_url: Retained::into_raw(url) as usize,
            identifier: Retained::into_raw(identifier) as usize,
            info_dictionary: info.map_or(0, |info| Retained::into_raw(info) as usize),
            original_url: unsafe { mem::transmute::<Imp, Getter>(url_method.implementation()) },
            original_identifier: unsafe {
                mem::transmute::<Imp, Getter>(identifier_method.implementation())
            },
            original_info: unsafe { mem::transmute::<Imp, Getter>(info_method.implementation()) },
        };
        if REDIRECT.set(redirect).is_err() {
            return Ok(());
        }

        unsafe {
            url_method.set_implementation(mem::transmute::<Getter, Imp>(
                redirected_bundle_url as Getter,
            ));
            identifier_method.set_implementation(mem::transmute::<Getter, Imp>(
                redirected_bundle_identifier as Getter,
            ));
            info_method.set_implementation(mem::transmute::<Getter, Imp>(
                redirected_info_dictionary as Getter,
            ));
        }

        debug!(identity = %descriptor, "main bundle redirected");
        Ok(())
    }
}
