//! Logging macros routed to `defmt`, `log`, or nothing depending on the enabled feature

#[cfg(all(feature = "log", feature = "defmt", not(doc)))]
compile_error!("features `log` and `defmt` are mutually exclusive");

#[cfg(all(not(doc), feature = "defmt"))]
#[macro_use]
mod backend {
    #[collapse_debuginfo(yes)]
    macro_rules! trace {
        ($s:literal $(, $x:expr)* $(,)?) => {
            ::defmt::trace!($s $(, $x)*)
        };
    }

    #[collapse_debuginfo(yes)]
    macro_rules! debug {
        ($s:literal $(, $x:expr)* $(,)?) => {
            ::defmt::debug!($s $(, $x)*)
        };
    }

    #[collapse_debuginfo(yes)]
    macro_rules! warn {
        ($s:literal $(, $x:expr)* $(,)?) => {
            ::defmt::warn!($s $(, $x)*)
        };
    }
}

#[cfg(all(not(doc), feature = "log"))]
#[macro_use]
mod backend {
    #[collapse_debuginfo(yes)]
    macro_rules! trace {
        ($s:literal $(, $x:expr)* $(,)?) => {
            ::log::trace!($s $(, $x)*)
        };
    }

    #[collapse_debuginfo(yes)]
    macro_rules! debug {
        ($s:literal $(, $x:expr)* $(,)?) => {
            ::log::debug!($s $(, $x)*)
        };
    }

    #[collapse_debuginfo(yes)]
    macro_rules! warn {
        ($s:literal $(, $x:expr)* $(,)?) => {
            ::log::warn!($s $(, $x)*)
        };
    }
}

// Also selected for `cargo doc`
#[cfg(any(doc, not(any(feature = "defmt", feature = "log"))))]
#[macro_use]
mod backend {
    #[collapse_debuginfo(yes)]
    macro_rules! trace {
        ($s:literal $(, $x:expr)* $(,)?) => {{
            let _ = ($(&$x),*);
        }};
    }

    #[collapse_debuginfo(yes)]
    macro_rules! debug {
        ($s:literal $(, $x:expr)* $(,)?) => {{
            let _ = ($(&$x),*);
        }};
    }

    #[collapse_debuginfo(yes)]
    macro_rules! warn {
        ($s:literal $(, $x:expr)* $(,)?) => {{
            let _ = ($(&$x),*);
        }};
    }
}
