#[unsafe(no_mangle)]
/// ### English
/// Returns the C ABI version.
///
/// ### 中文
/// 返回 C ABI 版本号。
pub extern "C" fn hwdec_render_abi_version() -> u32 {
    super::HWDEC_RENDER_ABI_VERSION
}
