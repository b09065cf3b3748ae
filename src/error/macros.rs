//! # 错误处理宏

/// 快速创建各类错误的宏
///
/// 第一个参数为 `GatewayError` 上的构造函数名：
/// `crate::gateway_err!(database, "查询失败: {}", id)`
#[macro_export]
macro_rules! gateway_err {
    ($kind:ident, $msg:expr) => {
        $crate::error::GatewayError::$kind($msg)
    };
    ($kind:ident, $fmt:expr, $($arg:tt)*) => {
        $crate::error::GatewayError::$kind(format!($fmt, $($arg)*))
    };
}

/// 确保条件成立，否则返回对应类型的错误
#[macro_export]
macro_rules! gateway_ensure {
    ($cond:expr, $kind:ident, $msg:expr) => {
        if !($cond) {
            return Err($crate::gateway_err!($kind, $msg));
        }
    };
    ($cond:expr, $kind:ident, $fmt:expr, $($arg:tt)*) => {
        if !($cond) {
            return Err($crate::gateway_err!($kind, $fmt, $($arg)*));
        }
    };
}
