//! `guide` service operations

use crate::define_operation;

define_operation! {
    operation: RequestReboot,
    service: Guide,
    method: "requestReboot",
    request: {},
    response: (),
}
