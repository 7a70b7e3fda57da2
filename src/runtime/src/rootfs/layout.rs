//! Rootfs directory layout.
//!
//! Defines the directory skeleton of the synthetic layer filesystem.

/// Rootfs filesystem layout.
#[derive(Debug, Clone)]
pub struct RootfsLayout {
    /// Directories for executables.
    pub bin_dirs: Vec<&'static str>,

    /// Directories for shared libraries.
    pub lib_dirs: Vec<&'static str>,

    /// Configuration directory.
    pub etc_dir: &'static str,

    /// Home directory of root.
    pub root_home: &'static str,

    /// Temporary directory.
    pub tmp_dir: &'static str,

    /// Kernel and device mount points, left empty.
    pub mount_points: Vec<&'static str>,
}

impl Default for RootfsLayout {
    fn default() -> Self {
        Self {
            bin_dirs: vec!["/bin", "/sbin", "/usr/bin"],
            lib_dirs: vec!["/lib", "/usr/lib"],
            etc_dir: "/etc",
            root_home: "/root",
            tmp_dir: "/tmp",
            mount_points: vec!["/dev", "/proc", "/sys"],
        }
    }
}

impl RootfsLayout {
    /// Get the standard Linux layout.
    pub fn standard() -> Self {
        Self::default()
    }

    /// Get all directories that need to be created in the rootfs.
    pub fn required_dirs(&self) -> Vec<&'static str> {
        let mut dirs = Vec::new();
        dirs.extend(self.bin_dirs.iter().copied());
        dirs.extend(self.lib_dirs.iter().copied());
        dirs.extend(self.mount_points.iter().copied());
        dirs.extend([
            self.etc_dir,
            self.root_home,
            self.tmp_dir,
            "/var",
            "/var/tmp",
            "/var/log",
        ]);
        dirs
    }
}
