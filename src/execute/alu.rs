//! Computational instruction dispatch.

use super::arith::{self, Logical};
use super::compare::{self, Select};
use super::divide::{self, DivideFunction, DividePrecision};
use super::{multiply, VectorOp, VectorOpcode};
use crate::state::ExecutionContext;
use crate::vector::VectorOps;

/// Vector ALU: multiply, add, select, logical and divide instructions.
pub struct VectorAlu;

impl VectorAlu {
    /// Execute one computational instruction on backend `V`.
    ///
    /// `vt` is permuted by the element code before use. Every instruction
    /// except VMOV, the reciprocals and VNOP writes all eight lanes of `vd`;
    /// VMOV and the reciprocals write the single lane `de`.
    pub fn execute<V: VectorOps>(op: &VectorOp, ctx: &mut ExecutionContext) {
        use VectorOpcode::*;

        let vs = V::load(&ctx.vector.read(op.vs));
        let vt = V::load(&ctx.vector.read(op.vt)).shuffle(op.element);

        let result = match op.opcode {
            Vmulf | Vmulu | Vmudl | Vmudm | Vmudn | Vmudh | Vmacf | Vmacu | Vmadl | Vmadm
            | Vmadn | Vmadh => Some(multiply::execute(op.opcode, &mut ctx.acc, vs, vt)),

            Vadd => Some(arith::vadd(ctx, vs, vt)),
            Vsub => Some(arith::vsub(ctx, vs, vt)),
            Vabs => Some(arith::vabs(ctx, vs, vt)),
            Vaddc => Some(arith::vaddc(ctx, vs, vt)),
            Vsubc => Some(arith::vsubc(ctx, vs, vt)),
            Vsar => Some(arith::vsar(ctx, op.element)),

            Vlt => Some(compare::select(ctx, Select::Lt, vs, vt)),
            Veq => Some(compare::select(ctx, Select::Eq, vs, vt)),
            Vne => Some(compare::select(ctx, Select::Ne, vs, vt)),
            Vge => Some(compare::select(ctx, Select::Ge, vs, vt)),
            Vcl => Some(compare::vcl(ctx, vs, vt)),
            Vch => Some(compare::vch(ctx, vs, vt)),
            Vcr => Some(compare::vcr(ctx, vs, vt)),
            Vmrg => Some(arith::vmrg(ctx, vs, vt)),

            Vand => Some(arith::logical(ctx, Logical::And, vs, vt)),
            Vnand => Some(arith::logical(ctx, Logical::Nand, vs, vt)),
            Vor => Some(arith::logical(ctx, Logical::Or, vs, vt)),
            Vnor => Some(arith::logical(ctx, Logical::Nor, vs, vt)),
            Vxor => Some(arith::logical(ctx, Logical::Xor, vs, vt)),
            Vnxor => Some(arith::logical(ctx, Logical::Nxor, vs, vt)),

            Vrcp | Vrcpl | Vrcph | Vrsq | Vrsql | Vrsqh => {
                let (function, precision) = Self::divide_mode(op.opcode);
                divide::execute(ctx, function, precision, op, vt);
                None
            }
            Vmov => {
                arith::vmov(ctx, op.vd, op.de(), vt);
                None
            }
            Vnop => None,
        };

        if let Some(vd) = result {
            ctx.vector.write(op.vd, vd.store());
        }
        ctx.instructions += 1;
    }

    fn divide_mode(opcode: VectorOpcode) -> (DivideFunction, DividePrecision) {
        use VectorOpcode::*;

        let function = match opcode {
            Vrsq | Vrsql | Vrsqh => DivideFunction::InverseSqrt,
            _ => DivideFunction::Reciprocal,
        };
        let precision = match opcode {
            Vrcpl | Vrsql => DividePrecision::Low,
            Vrcph | Vrsqh => DividePrecision::High,
            _ => DividePrecision::Single,
        };
        (function, precision)
    }
}
