use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, ItemFn};

/// Time a function when the `perf_stats` feature is enabled.
///
/// The generated guard logs `[PERF] <fn>: <elapsed>` through Bevy's `info!`
/// when the call takes longer than the threshold (milliseconds, default 1),
/// and through `trace!` otherwise. Without `perf_stats` the guard is not
/// emitted at all.
///
/// # Example
/// ```ignore
/// #[profile(5)]
/// pub fn create_next_search_level(&self, graph: &mut WaypointGraph, level: u32) -> GraphResult<LevelOutcome> {
///     // ... work ...
/// }
/// ```
#[proc_macro_attribute]
pub fn profile(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);

    let threshold_ms: u128 = if attr.is_empty() {
        1
    } else {
        attr.to_string().trim().parse().unwrap_or(1)
    };

    let attrs = &input.attrs;
    let vis = &input.vis;
    let sig = &input.sig;
    let block = &input.block;
    let fn_name_str = sig.ident.to_string();

    let output = quote! {
        #(#attrs)*
        #vis #sig {
            #[cfg(feature = "perf_stats")]
            let _profile_timer = {
                struct PerfGuard {
                    name: &'static str,
                    start: std::time::Instant,
                }
                impl Drop for PerfGuard {
                    fn drop(&mut self) {
                        let elapsed = self.start.elapsed();
                        if elapsed.as_millis() > #threshold_ms {
                            bevy::log::info!("[PERF] {}: {:?}", self.name, elapsed);
                        } else {
                            bevy::log::trace!("[PERF] {}: {:?}", self.name, elapsed);
                        }
                    }
                }
                PerfGuard {
                    name: #fn_name_str,
                    start: std::time::Instant::now(),
                }
            };

            #block
        }
    };

    output.into()
}
