//! Token generation for individual trampolines and shared helpers

use crate::error::CodegenError;
use crate::generator::CodegenOptions;
use ab_contracts_abigen::{Operation, OperationRole};
use proc_macro2::{Literal, TokenStream};
use quote::{format_ident, quote};
use syn::{Ident, Path, Type};

/// Link section collecting `name:symbol` export records of each role
fn link_section(role: OperationRole) -> &'static str {
    match role {
        OperationRole::Action => ".eosio_actions",
        OperationRole::Call => ".eosio_calls",
        OperationRole::Notify => ".eosio_notify",
    }
}

/// Section holding embedded ABI document
const ABI_LINK_SECTION: &str = ".eosio_abi";
/// Exported entry point carrying embedded ABI
pub const ABI_ENTRY_SYMBOL: &str = "__insert_eosio_abi";
/// Helper that copies synchronous call payload into linear memory
pub const SYNC_CALL_DATA_SYMBOL: &str = "__eos_get_sync_call_data_";
/// Helper that decodes synchronous call header from a payload
pub const SYNC_CALL_DATA_HEADER_SYMBOL: &str = "__eos_get_sync_call_data_header_";

/// How a deserialized argument is passed to the method
enum PassBy {
    Value,
    Ref,
    MutRef,
}

fn parse_parameter_type(spelling: &str, operation: &str) -> Result<(Type, PassBy), CodegenError> {
    let ty = syn::parse_str::<Type>(spelling).map_err(|source| {
        CodegenError::InvalidTypeSpelling {
            spelling: spelling.to_string(),
            operation: operation.to_string(),
            source,
        }
    })?;

    Ok(match ty {
        Type::Reference(reference) => {
            let pass_by = if reference.mutability.is_some() {
                PassBy::MutRef
            } else {
                PassBy::Ref
            };
            (*reference.elem, pass_by)
        }
        ty => (ty, PassBy::Value),
    })
}

fn linkage(options: &CodegenOptions) -> TokenStream {
    if options.weak_linkage {
        quote! { #[linkage = "weak"] }
    } else {
        TokenStream::new()
    }
}

/// Static placed into a link section so the linker can associate `export` with the symbol.
///
/// Named after the symbol verbatim, symbols that only differ in case get distinct statics.
fn export_record(symbol: &Ident, section: &str, export: &str) -> TokenStream {
    let static_name = format_ident!("{symbol}_EXPORT");
    let len = Literal::usize_unsuffixed(export.len());
    let bytes = Literal::byte_string(export.as_bytes());

    quote! {
        #[doc(hidden)]
        #[used]
        #[allow(non_upper_case_globals, reason = "Named after the exported symbol")]
        #[unsafe(link_section = #section)]
        static #static_name: [u8; #len] = *#bytes;
    }
}

/// Trampoline of a single operation
pub(crate) fn dispatcher(
    runtime: &Path,
    options: &CodegenOptions,
    operation: &Operation,
    symbol: &Ident,
    export: &str,
) -> Result<TokenStream, CodegenError> {
    let function = operation.function();

    let class = syn::parse_str::<Path>(&operation.class_path).map_err(|source| {
        CodegenError::InvalidTypeSpelling {
            spelling: operation.class_path.clone(),
            operation: function.clone(),
            source,
        }
    })?;
    let method = syn::parse_str::<Ident>(&operation.method_name).map_err(|_error| {
        CodegenError::InvalidIdentifier {
            identifier: operation.method_name.clone(),
            operation: function.clone(),
        }
    })?;

    let mut read_args = Vec::with_capacity(operation.parameters.len());
    let mut call_args = Vec::with_capacity(operation.parameters.len());
    for (index, parameter) in operation.parameters.iter().enumerate() {
        let arg = format_ident!("arg{index}");
        let (ty, pass_by) = parse_parameter_type(&parameter.spelling, &function)?;
        match pass_by {
            PassBy::Value => {
                read_args.push(quote! { let #arg = <#ty as rt::Read>::read(&mut ds); });
                call_args.push(quote! { #arg });
            }
            PassBy::Ref => {
                read_args.push(quote! { let #arg = <#ty as rt::Read>::read(&mut ds); });
                call_args.push(quote! { &#arg });
            }
            PassBy::MutRef => {
                read_args.push(quote! { let mut #arg = <#ty as rt::Read>::read(&mut ds); });
                call_args.push(quote! { &mut #arg });
            }
        }
    }

    let exec_type = match operation.role {
        OperationRole::Action | OperationRole::Notify => quote! { rt::ExecType::Action },
        OperationRole::Call => quote! { rt::ExecType::Call },
    };
    let set_exec_type = operation
        .derives_base_contract
        .then(|| quote! { contract.set_exec_type(#exec_type); });

    let set_return_value = match operation.role {
        OperationRole::Action | OperationRole::Notify => quote! { rt::set_action_return_value },
        OperationRole::Call => quote! { rt::set_call_return_value },
    };
    let invoke = if operation.result.is_some() {
        quote! {
            let result = contract.#method(#( #call_args ),*);
            #set_return_value(&rt::pack(&result));
        }
    } else {
        quote! {
            contract.#method(#( #call_args ),*);
        }
    };

    let linkage = linkage(options);
    let export_record = export_record(symbol, link_section(operation.role), export);
    let symbol_name = symbol.to_string();
    let doc = format!(
        " Dispatcher of {} `{}` implemented by `{function}`",
        operation.role, operation.name
    );

    let tokens = match operation.role {
        OperationRole::Action | OperationRole::Notify => {
            let stack_buffer_limit = Literal::usize_unsuffixed(options.stack_buffer_limit);

            quote! {
                #[doc = #doc]
                #[unsafe(export_name = #symbol_name)]
                #linkage
                pub extern "C" fn #symbol(receiver: u64, code: u64) {
                    use #runtime as rt;

                    let size = rt::action_data_size();
                    let mut stack_buffer = [0u8; #stack_buffer_limit];
                    let payload: &mut [u8] = if size == 0 {
                        &mut []
                    } else if size < #stack_buffer_limit {
                        &mut stack_buffer[..size]
                    } else {
                        rt::heap_buffer(size)
                    };
                    if !payload.is_empty() {
                        rt::read_action_data(payload);
                    }
                    let mut ds = rt::DataStream::new(payload);

                    #( #read_args )*

                    #[allow(unused_mut, reason = "Not every method takes `&mut self`")]
                    let mut contract = <#class as rt::Contract>::new(
                        rt::Name::new(receiver),
                        rt::Name::new(code),
                        ds,
                    );
                    #set_exec_type
                    #invoke
                }

                #export_record
            }
        }
        OperationRole::Call => {
            quote! {
                #[doc = #doc]
                ///
                /// # Safety
                ///
                /// `data` must point to `data_size` readable bytes.
                #[unsafe(export_name = #symbol_name)]
                #linkage
                pub unsafe extern "C" fn #symbol(
                    sender: u64,
                    receiver: u64,
                    data_size: usize,
                    data: *const u8,
                ) {
                    use #runtime as rt;

                    let _ = sender;
                    let payload: &[u8] = if data_size == 0 {
                        &[]
                    } else {
                        // SAFETY: Guaranteed by the caller (host)
                        unsafe { ::core::slice::from_raw_parts(data, data_size) }
                    };
                    let mut ds = rt::DataStream::new(payload);
                    // Selector was already used by the host to route the call here
                    let _header = <rt::CallDataHeader as rt::Read>::read(&mut ds);

                    #( #read_args )*

                    #[allow(unused_mut, reason = "Not every method takes `&mut self`")]
                    let mut contract = <#class as rt::Contract>::new(
                        rt::Name::new(receiver),
                        rt::Name::new(receiver),
                        ds,
                    );
                    #set_exec_type
                    #invoke
                }

                #export_record
            }
        }
    };

    Ok(tokens)
}

/// Helpers shared by all synchronous call trampolines
pub(crate) fn call_helpers(runtime: &Path, options: &CodegenOptions) -> TokenStream {
    let linkage = linkage(options);
    let call_data = format_ident!("{SYNC_CALL_DATA_SYMBOL}");
    let call_data_header = format_ident!("{SYNC_CALL_DATA_HEADER_SYMBOL}");

    quote! {
        /// Copy synchronous call payload of `size` bytes into linear memory
        #[unsafe(export_name = #SYNC_CALL_DATA_SYMBOL)]
        #linkage
        pub extern "C" fn #call_data(size: usize) -> *mut u8 {
            use #runtime as rt;

            let data = rt::heap_buffer(size);
            rt::get_call_data(data);
            data.as_mut_ptr()
        }

        /// Decode header at the beginning of synchronous call payload
        ///
        /// # Safety
        ///
        /// `data` must point to at least an encoded call data header.
        #[unsafe(export_name = #SYNC_CALL_DATA_HEADER_SYMBOL)]
        #linkage
        pub unsafe extern "C" fn #call_data_header(data: *const u8) -> *mut u8 {
            use #runtime as rt;

            // SAFETY: Guaranteed by the caller
            let encoded = unsafe {
                ::core::slice::from_raw_parts(data, rt::CallDataHeader::ENCODED_SIZE)
            };
            let mut ds = rt::DataStream::new(encoded);
            let header = <rt::CallDataHeader as rt::Read>::read(&mut ds);
            let copy = rt::heap_buffer(rt::CallDataHeader::ENCODED_SIZE);
            rt::write_into(&header, copy);
            copy.as_mut_ptr()
        }
    }
}

/// Entry point embedding ABI document into the compiled contract
pub(crate) fn abi_embedding(runtime: &Path, options: &CodegenOptions, abi: &str) -> TokenStream {
    let linkage = linkage(options);
    let entry = format_ident!("{ABI_ENTRY_SYMBOL}");
    let len = Literal::usize_unsuffixed(abi.len());
    let bytes = Literal::byte_string(abi.as_bytes());

    quote! {
        #[doc(hidden)]
        #[used]
        #[unsafe(link_section = #ABI_LINK_SECTION)]
        static __EOSIO_ABI: [u8; #len] = *#bytes;

        /// Carries embedded ABI, never meant to be called
        #[unsafe(export_name = #ABI_ENTRY_SYMBOL)]
        #linkage
        pub extern "C" fn #entry(receiver: u64, code: u64, action: u64) {
            use #runtime as rt;

            let _ = (receiver, code, action);
            rt::eosio_assert_code(false, 1);
        }
    }
}
