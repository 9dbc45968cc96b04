//! Binary-name prefix tables
//!
//! Types are classified by the package prefix of their binary name. Two
//! ordered lists identify library and VM-internal types; everything else is
//! application code. The library list is consulted first, so it wins if a
//! name were ever to match both lists — a conforming table keeps the lists
//! disjoint and never relies on that precedence.

use serde::{Deserialize, Serialize};

/// Default library prefixes.
///
/// The `Ljavax/` and `Lorg/xml/` families are deliberately absent: the
/// package relationships there are tangled (gnu/javax extends javax.*,
/// javax.xml.* calls org.xml.sax.* directly, and workloads subclass
/// javax.net.ssl types), so those trees classify as application code.
const LIBRARY_PREFIXES: &[&str] = &[
    "Ljava/",
    "Lgnu/java/", // there is a gnu/javax package as well
    "Lgnu/classpath/",
    "Lsun/misc/Unsafe",
];

/// Default VM-internal prefixes.
const VM_PREFIXES: &[&str] = &[
    "Lorg/jikesrvm/",
    "Lorg/mmtk/",
    "Lorg/vmutil/",
    "Lorg/vmmagic/",
    "Lcom/ibm/tuningfork/",
    "L$Proxy",
];

/// Ordered prefix lists classifying binary type names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefixTable {
    /// Library prefixes, checked first.
    library: Vec<String>,
    /// VM-internal prefixes.
    vm: Vec<String>,
}

impl PrefixTable {
    /// Table with custom prefix lists.
    ///
    /// The library list takes precedence over the VM list.
    pub fn new(library: Vec<String>, vm: Vec<String>) -> Self {
        Self { library, vm }
    }

    /// Does `name` denote a class-library type?
    #[inline]
    pub fn is_library(&self, name: &str) -> bool {
        self.library.iter().any(|p| name.starts_with(p.as_str()))
    }

    /// Does `name` denote a VM-internal type?
    #[inline]
    pub fn is_vm(&self, name: &str) -> bool {
        self.vm.iter().any(|p| name.starts_with(p.as_str()))
    }

    /// Does `name` denote an application type?
    #[inline]
    pub fn is_application(&self, name: &str) -> bool {
        !self.is_library(name) && !self.is_vm(name)
    }

    /// True if no name can match both lists.
    ///
    /// Two prefixes can match a common name exactly when one is a prefix of
    /// the other, so disjointness reduces to a pairwise prefix check across
    /// the lists.
    pub fn is_disjoint(&self) -> bool {
        self.library.iter().all(|l| {
            self.vm
                .iter()
                .all(|v| !l.starts_with(v.as_str()) && !v.starts_with(l.as_str()))
        })
    }
}

impl Default for PrefixTable {
    fn default() -> Self {
        Self {
            library: LIBRARY_PREFIXES.iter().map(|s| s.to_string()).collect(),
            vm: VM_PREFIXES.iter().map(|s| s.to_string()).collect(),
        }
    }
}
