/*!
Host-side primitives for the AppArmor user namespace profile shipped with Lutris.

The removal hook in `lutris-postrm` drives these: [`host`] answers whether the
restriction is active, [`profile`] removes the files the package owns and
[`reboot`] records that the host needs a reboot to drop the loaded profile.
*/

pub mod error;
pub mod host;
pub mod profile;
pub mod reboot;

pub use error::{ProfileError, validate_package_name};
pub use host::{HostMarkers, HostState};
pub use profile::{OwnedProfiles, ProfileRemoval};
pub use reboot::{FileRebootState, MemoryRebootState, RebootSnapshot, RebootStateStore};
